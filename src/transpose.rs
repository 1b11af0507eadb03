//! Transposition of chord symbols by a number of semitones.

use log::warn;

use crate::model::Token;

const SHARP_NAMES: [&str; 12] = ["A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#"];

/// Semitone position (A = 0) of a note name, sharps and flats accepted.
fn note_position(name: &str) -> Option<i32> {
    let pos = match name {
        "A" => 0,
        "A#" | "Bb" => 1,
        "B" | "Cb" => 2,
        "C" | "B#" => 3,
        "C#" | "Db" => 4,
        "D" => 5,
        "D#" | "Eb" => 6,
        "E" | "Fb" => 7,
        "F" | "E#" => 8,
        "F#" | "Gb" => 9,
        "G" => 10,
        "G#" | "Ab" => 11,
        _ => return None,
    };
    Some(pos)
}

/// Split a leading note name off `s`, two-character names first.
fn split_root(s: &str) -> Option<(i32, &str)> {
    for len in [2, 1] {
        if let (Some(head), Some(tail)) = (s.get(..len), s.get(len..)) {
            if let Some(pos) = note_position(head) {
                return Some((pos, tail));
            }
        }
    }
    None
}

fn shifted_name(pos: i32, shift: i32) -> &'static str {
    SHARP_NAMES[(pos + shift).rem_euclid(12) as usize]
}

/// Shift the root (and slash bass, if any) of a chord symbol.
///
/// Symbols without a recognizable root are returned unchanged.
pub fn shift_chord(chord: &str, shift: i32) -> String {
    if shift == 0 {
        return chord.to_string();
    }

    let Some((root, rest)) = split_root(chord) else {
        warn!("can't shift chord: {chord}");
        return chord.to_string();
    };

    let mut out = String::from(shifted_name(root, shift));
    match rest.rsplit_once('/') {
        Some((quality, bass)) => match split_root(bass) {
            Some((bass_pos, bass_rest)) => {
                out.push_str(quality);
                out.push('/');
                out.push_str(shifted_name(bass_pos, shift));
                out.push_str(bass_rest);
            }
            None => out.push_str(rest),
        },
        None => out.push_str(rest),
    }
    out
}

/// Transpose the chords of a token; non-chord tokens pass through.
pub fn transpose_token(token: Token, shift: i32) -> Token {
    if shift == 0 {
        return token;
    }
    match token {
        Token::Line(segments) => Token::Line(segments.map_chords(|c| shift_chord(c, shift))),
        Token::ChordDefine { name, spec } => {
            warn!("can't shift a chord definition yet: {name}");
            Token::ChordDefine { name, spec }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Segments;

    #[test]
    fn shifts_roots_with_sharps() {
        assert_eq!(shift_chord("C", 2), "D");
        assert_eq!(shift_chord("Am7", 3), "Cm7");
        assert_eq!(shift_chord("Bb", 1), "B");
        assert_eq!(shift_chord("E", 1), "F");
        assert_eq!(shift_chord("G#m", -1), "Gm");
    }

    #[test]
    fn wraps_around_the_octave() {
        assert_eq!(shift_chord("G", 5), "C");
        assert_eq!(shift_chord("A", -1), "G#");
        assert_eq!(shift_chord("D", 24), "D");
    }

    #[test]
    fn slash_bass_moves_too() {
        assert_eq!(shift_chord("C/G", 2), "D/A");
        assert_eq!(shift_chord("Dm7/C", -2), "Cm7/A#");
    }

    #[test]
    fn unknown_roots_are_kept() {
        assert_eq!(shift_chord("N.C.", 3), "N.C.");
        assert_eq!(shift_chord("%", 3), "%");
    }

    #[test]
    fn only_chords_of_lines_change() {
        let line: Segments = ["", "C", "Hello ", "G", "world"].into_iter().collect();
        let shifted = transpose_token(Token::Line(line), 2);
        let expected: Segments = ["", "D", "Hello ", "A", "world"].into_iter().collect();
        assert_eq!(shifted, Token::Line(expected));
        assert_eq!(
            transpose_token(Token::Title("C".into()), 2),
            Token::Title("C".into())
        );
    }
}
