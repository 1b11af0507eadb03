//! Songsheet renderer — lays a token stream out on a paginated surface.
//!
//! [`SongRenderer`] keeps a cursor over a multi-column page. Every token
//! moves the cursor and draws through the [`Surface`]; content that would
//! run past the bottom of a column moves to the next column, and past the
//! last column to a new page. Chord diagrams for the chords a song used are
//! drawn at the bottom of the page when the song ends.

mod constants;
mod diagrams;
mod lines;
mod page;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::chords::ChordRegistry;
use crate::error::Result;
use crate::model::{Segments, Token};
use crate::style::Styles;
use crate::surface::{Align, Surface};
use constants::*;
use lines::LineStyles;
use page::PageFrame;

pub use constants::DiagramGeometry;

// ═══════════════════════════════════════════════════════════════════════
// Options and state
// ═══════════════════════════════════════════════════════════════════════

/// Switches that change the layout but are not part of a stylesheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOptions {
    /// Always reserve a chord row, even for lines without chords
    pub disable_compact: bool,
    /// Print the source file name in the page footer
    pub show_filenames: bool,
    /// Mirror margins on facing pages
    pub duplex: bool,
    pub diagram: DiagramGeometry,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            disable_compact: false,
            show_filenames: false,
            duplex: true,
            diagram: DiagramGeometry::default(),
        }
    }
}

/// Cursor and pagination state, in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutState {
    pub x: f64,
    /// Baseline of the last thing drawn; decreases down the page
    pub y: f64,
    pub column_width: f64,
    pub column_start_y: f64,
    /// Number of pages started so far
    pub page_number: usize,
    pub in_chorus: bool,
    pub tab_mode: bool,
    pub skip_next_flush: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// SongRenderer
// ═══════════════════════════════════════════════════════════════════════

pub struct SongRenderer<S: Surface> {
    surface: S,
    styles: Styles,
    registry: ChordRegistry,
    options: RenderOptions,
    state: LayoutState,
    frame: PageFrame,
    page_open: bool,
    song_started: bool,
    filename: Option<String>,
    /// Top of the open chorus bracket
    chorus_mark: Option<(f64, f64)>,
}

impl<S: Surface> SongRenderer<S> {
    pub fn new(surface: S, styles: Styles, registry: ChordRegistry, options: RenderOptions) -> Self {
        let frame = PageFrame::new(surface.page_size(), styles.margin, 1, options.duplex);
        let state = LayoutState {
            x: frame.left,
            y: frame.top,
            column_width: frame.width(),
            column_start_y: frame.top,
            page_number: 0,
            in_chorus: false,
            tab_mode: false,
            skip_next_flush: false,
        };
        Self {
            surface,
            styles,
            registry,
            options,
            state,
            frame,
            page_open: false,
            song_started: false,
            filename: None,
            chorus_mark: None,
        }
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn registry(&self) -> &ChordRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Render one input file: starts a new song, then consumes `tokens`.
    ///
    /// Stops at the first tokenizer error and returns it; the caller decides
    /// whether to [`close`](Self::close) the output.
    pub fn render_song<I>(&mut self, filename: &str, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<Token>>,
    {
        self.filename = Some(filename.to_string());
        self.state.tab_mode = false;
        self.new_song();
        for token in tokens {
            self.handle(token?);
        }
        Ok(())
    }

    /// Process a single token. Content problems are logged, never returned.
    pub fn handle(&mut self, token: Token) {
        trace!("token {}: {:?}", token.kind(), token);
        if !self.song_started && token != Token::NewSong {
            self.new_song();
        }

        match token {
            Token::NewSong => self.new_song(),
            Token::Title(text) => self.draw_heading(&text, false),
            Token::SubTitle(text) => self.draw_heading(&text, true),
            Token::Comment(text) => self.draw_comment(&text),
            Token::StartOfChorus => self.start_chorus(),
            Token::EndOfChorus => self.end_chorus(),
            Token::StartOfTab => {
                if self.state.tab_mode {
                    warn!("start_of_tab inside a tab block");
                }
                self.state.tab_mode = true;
                self.surface.set_font(&self.styles.tab.font);
            }
            Token::EndOfTab => {
                if !self.state.tab_mode {
                    warn!("end_of_tab outside a tab block");
                }
                self.state.tab_mode = false;
            }
            Token::Columns(n) => self.set_columns(n),
            Token::ColumnBreak => self.column_break(),
            Token::NewPage => {
                self.page_break();
                self.state.column_width = self.frame.width();
            }
            Token::ChordDefine { name, spec } => {
                if let Err(e) = self.registry.define(&name, &spec) {
                    warn!("bad chord definition {name}: {e}");
                }
            }
            Token::NoGrid => self.state.skip_next_flush = true,
            Token::Blank => self.state.y -= self.styles.blank.line_height,
            Token::SourceComment(_) => {}
            Token::TabLine(text) => self.draw_tab_line(&text),
            Token::Line(segments) => self.draw_line(&segments),
        }
    }

    /// Flush the last song's diagrams, close the page and finalize the output.
    pub fn finish(&mut self) -> Result<()> {
        if self.song_started {
            self.suspend_chorus();
            self.flush_diagrams();
        }
        self.close()
    }

    /// Close the page and finalize without drawing anything else.
    pub fn close(&mut self) -> Result<()> {
        if self.page_open {
            self.surface.finish_page();
            self.page_open = false;
        }
        self.surface.finalize()
    }

    // ── Songs and pages ─────────────────────────────────────────────

    fn new_song(&mut self) {
        if self.song_started {
            // close a chorus the previous song left open
            self.suspend_chorus();
            self.flush_diagrams();
        }
        self.song_started = true;
        self.registry.new_song();
        self.new_page();
        self.state.column_width = self.frame.width();
    }

    fn new_page(&mut self) {
        if self.page_open {
            self.surface.finish_page();
        }
        self.state.page_number += 1;
        debug!("page {}", self.state.page_number);
        self.surface.start_page();
        self.page_open = true;

        self.frame = PageFrame::new(
            self.surface.page_size(),
            self.styles.margin,
            self.state.page_number,
            self.options.duplex,
        );
        let filename = self.filename.as_deref().filter(|_| self.options.show_filenames);
        self.frame.decorate(&mut self.surface, &self.styles, filename);

        self.state.x = self.frame.left;
        self.state.y = self.frame.top;
        self.state.column_start_y = self.frame.top;
        if self.state.tab_mode {
            self.surface.set_font(&self.styles.tab.font);
        }
    }

    /// New page with the open chorus bracket carried over.
    fn page_break(&mut self) {
        let in_chorus = self.suspend_chorus();
        self.new_page();
        if in_chorus {
            self.state.x += self.styles.chorus.indent;
            self.resume_chorus();
        }
    }

    fn set_columns(&mut self, n: i32) {
        if n <= 0 {
            warn!("ignoring columns: {n}");
            return;
        }
        self.state.column_width = self.frame.width() / n as f64;
        self.state.column_start_y = self.state.y;
    }

    fn column_break(&mut self) {
        let in_chorus = self.suspend_chorus();
        self.state.y = self.state.column_start_y;
        self.state.x += self.state.column_width;
        if self.state.x + 1.0 > self.frame.right {
            self.new_page();
            if in_chorus {
                self.state.x += self.styles.chorus.indent;
            }
        } else {
            debug!("column break to x={:.1}", self.state.x);
        }
        if in_chorus {
            self.resume_chorus();
        }
    }

    /// Move to the next column if `needed` points don't fit above the bottom.
    fn ensure_room(&mut self, needed: f64) {
        if self.state.y < self.frame.bottom + needed {
            self.column_break();
        }
    }

    // ── Chorus ──────────────────────────────────────────────────────

    fn start_chorus(&mut self) {
        if self.chorus_mark.is_some() {
            warn!("start_of_chorus inside a chorus");
            return;
        }
        self.state.x += self.styles.chorus.indent;
        self.resume_chorus();
    }

    fn end_chorus(&mut self) {
        if !self.suspend_chorus() {
            warn!("end_of_chorus outside a chorus");
            return;
        }
        self.state.x -= self.styles.chorus.indent;
    }

    /// Mark the bracket top at the current (indented) position.
    fn resume_chorus(&mut self) {
        let x = self.state.x - self.styles.chorus.indent - CHORUS_MARK_INSET;
        self.chorus_mark = Some((x, self.state.y));
        self.state.in_chorus = true;
    }

    /// Draw the bracket from its mark down to the current line. Returns
    /// whether a chorus was open.
    fn suspend_chorus(&mut self) -> bool {
        let Some((mark_x, mark_y)) = self.chorus_mark.take() else {
            return false;
        };
        self.state.in_chorus = false;
        let x = self.state.x - self.styles.chorus.indent - CHORUS_MARK_INSET;
        self.surface.set_stroke_color(self.styles.chorus.color);
        self.surface.set_line_width(CHORUS_BAR_WIDTH);
        self.surface.line(mark_x, mark_y, x, self.state.y - CHORUS_CLOSE_DROP);
        true
    }

    // ── Content ─────────────────────────────────────────────────────

    fn draw_heading(&mut self, text: &str, subtitle: bool) {
        let style = if subtitle { &self.styles.subtitle } else { &self.styles.title };
        self.state.y -= style.line_height;
        self.surface.set_font(&style.font);
        self.surface.set_fill_color(style.color);
        let x = self.frame.aligned_x(style.align);
        self.surface.draw_string(x, self.state.y, text, style.align);
    }

    fn draw_comment(&mut self, text: &str) {
        let height = self.styles.comment.line_height;
        self.ensure_room(height * LINE_OVERFLOW_SLACK);
        self.state.y -= height;
        let style = &self.styles.comment;
        self.surface.set_font(&style.font);
        self.surface.set_fill_color(style.color);
        self.surface.draw_string(self.state.x, self.state.y, text, Align::Left);
    }

    fn draw_tab_line(&mut self, text: &str) {
        let height = self.styles.tab.line_height;
        self.ensure_room(height * TAB_OVERFLOW_SLACK);
        self.state.y -= height;
        let style = &self.styles.tab;
        self.surface.set_font(&style.font);
        self.surface.set_fill_color(style.color);
        self.surface.draw_string(self.state.x, self.state.y, text, Align::Left);
    }

    fn draw_line(&mut self, segments: &Segments) {
        let advance = {
            let styles = LineStyles {
                lyric: if self.state.in_chorus { &self.styles.chorus } else { &self.styles.line },
                chord: &self.styles.chord,
            };
            lines::line_advance(segments, &styles, self.options.disable_compact)
        };
        self.ensure_room(advance * LINE_OVERFLOW_SLACK);
        self.state.y -= advance;

        let styles = LineStyles {
            lyric: if self.state.in_chorus { &self.styles.chorus } else { &self.styles.line },
            chord: &self.styles.chord,
        };
        lines::draw_line(
            &mut self.surface,
            &mut self.registry,
            &styles,
            self.state.x,
            self.state.y,
            segments,
        );
    }

    // ── Diagrams ────────────────────────────────────────────────────

    /// Draw boxes for the chords used since the last flush, unless the song
    /// asked for no grid. The used set is emptied either way.
    fn flush_diagrams(&mut self) {
        let names = self.registry.take_flush_order();
        if std::mem::take(&mut self.state.skip_next_flush) {
            debug!("diagrams suppressed for {} chord(s)", names.len());
            return;
        }
        if names.is_empty() || !self.page_open {
            return;
        }
        let drawn = diagrams::draw_chord_boxes(
            &mut self.surface,
            &self.frame,
            &names,
            &self.registry,
            &self.styles,
            &self.options.diagram,
        );
        debug!("drew {drawn} chord diagram(s)");
    }
}
