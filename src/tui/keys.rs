use std::io;
use std::time::Duration;

use super::surface::{INTERRUPT, RESIZE, Surface};

pub const ESC: i32 = 0x1b;

/// How long to wait after ESC for the rest of an escape sequence
pub const ESCAPE_WAIT: Duration = Duration::from_millis(50);

/// Longest escape sequence body we are willing to buffer
const MAX_SEQUENCE: usize = 16;

/// A decoded key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Ctrl plus a letter, as the lower-case letter
    Ctrl(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Esc,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    ShiftUp,
    ShiftDown,
    CtrlLeft,
    CtrlRight,
    /// ESC followed immediately by a printable character
    Alt(char),
    AltBackspace,
    AltUp,
    AltDown,
    AltLeft,
    AltRight,
    Resize,
    Interrupt,
    /// Any other special code from the surface
    Special(i32),
}

/// Result of feeding one code to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Key(Key),
    /// More codes are needed
    Pending,
    /// The codes seen so far formed nothing we understand
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    SawEscape,
    /// Bytes after ESC, starting with `[` or `O`
    InSequence(Vec<u8>),
    /// A UTF-8 character in progress; `alt` when it followed an ESC
    InChar { bytes: Vec<u8>, need: usize, alt: bool },
    /// An overlong sequence; bytes are dropped up to its final byte
    Skipping,
}

/// Turns raw key codes into [`Key`] events.
///
/// Terminals send arrows, Home/End, Delete and modified arrows as short runs
/// of bytes starting with ESC, and a lone ESC looks exactly like the start of
/// such a run. The decoder keeps the partial run; the caller decides when the
/// lookahead has expired and calls [`KeyDecoder::timeout`].
#[derive(Debug, Clone, Default)]
pub struct KeyDecoder {
    state: State,
}

impl KeyDecoder {
    pub fn new() -> Self {
        KeyDecoder::default()
    }

    /// True while a partial sequence or character is buffered
    pub fn is_pending(&self) -> bool {
        self.state != State::Idle
    }

    pub fn feed(&mut self, code: i32) -> Decoded {
        // Specials interrupt whatever was in progress.
        if code >= 256 || code < 0 {
            self.state = State::Idle;
            return match code {
                RESIZE => Decoded::Key(Key::Resize),
                INTERRUPT => Decoded::Key(Key::Interrupt),
                c if c >= 256 => Decoded::Key(Key::Special(c)),
                _ => Decoded::Discarded,
            };
        }
        let byte = code as u8;

        match std::mem::take(&mut self.state) {
            State::Idle => self.idle(byte),
            State::SawEscape => self.after_escape(byte),
            State::InSequence(mut bytes) => {
                bytes.push(byte);
                self.sequence(bytes)
            }
            State::InChar {
                mut bytes,
                need,
                alt,
            } => {
                if !is_continuation(byte) {
                    // The broken character is dropped; the byte starts afresh
                    return self.idle(byte);
                }
                bytes.push(byte);
                if bytes.len() < need {
                    self.state = State::InChar { bytes, need, alt };
                    return Decoded::Pending;
                }
                match std::str::from_utf8(&bytes).ok().and_then(|s| s.chars().next()) {
                    Some(c) if alt => Decoded::Key(Key::Alt(c)),
                    Some(c) => Decoded::Key(Key::Char(c)),
                    None => Decoded::Discarded,
                }
            }
            State::Skipping => self.skipping(byte),
        }
    }

    /// The lookahead window expired. A lone ESC becomes [`Key::Esc`]; any
    /// partial sequence is dropped.
    pub fn timeout(&mut self) -> Decoded {
        match std::mem::take(&mut self.state) {
            State::Idle => Decoded::Pending,
            State::SawEscape => Decoded::Key(Key::Esc),
            State::InSequence(_) | State::InChar { .. } | State::Skipping => Decoded::Discarded,
        }
    }

    fn idle(&mut self, byte: u8) -> Decoded {
        let key = match byte {
            0x1b => {
                self.state = State::SawEscape;
                return Decoded::Pending;
            }
            b'\r' | b'\n' => Key::Enter,
            b'\t' => Key::Tab,
            0x7f | 0x08 => Key::Backspace,
            0x01..=0x1a => Key::Ctrl(char::from(b'a' + byte - 1)),
            0x20..=0x7e => Key::Char(char::from(byte)),
            _ => return self.start_char(byte, false),
        };
        Decoded::Key(key)
    }

    fn after_escape(&mut self, byte: u8) -> Decoded {
        let key = match byte {
            b'[' | b'O' => {
                self.state = State::InSequence(vec![byte]);
                return Decoded::Pending;
            }
            // ESC ESC: the first one was a lone Esc, the second may start a sequence
            0x1b => {
                self.state = State::SawEscape;
                Key::Esc
            }
            0x7f | 0x08 => Key::AltBackspace,
            0x20..=0x7e => Key::Alt(char::from(byte)),
            0x80..=0xff => return self.start_char(byte, true),
            _ => return self.idle(byte),
        };
        Decoded::Key(key)
    }

    fn start_char(&mut self, lead: u8, alt: bool) -> Decoded {
        let need = match lead {
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Decoded::Discarded,
        };
        self.state = State::InChar {
            bytes: vec![lead],
            need,
            alt,
        };
        Decoded::Pending
    }

    fn sequence(&mut self, bytes: Vec<u8>) -> Decoded {
        let Some(&last) = bytes.last() else {
            return Decoded::Discarded;
        };
        if last == 0x1b {
            // A new sequence started before this one finished
            self.state = State::SawEscape;
            return Decoded::Pending;
        }
        if !(0x20..=0x7e).contains(&last) {
            // Not sequence material: drop the partial run, keep the key
            return self.idle(last);
        }
        if bytes[0] == b'O' {
            // SS3 sequences are always one byte after the introducer
            return match parse_ss3(last) {
                Some(key) => Decoded::Key(key),
                None => Decoded::Discarded,
            };
        }
        // Linux console function keys: ESC [ [ <letter>
        if bytes.len() == 2 && last == b'[' {
            self.state = State::InSequence(bytes);
            return Decoded::Pending;
        }
        if bytes.len() > 1 && is_final(last) {
            if bytes[1] == b'[' {
                return Decoded::Discarded;
            }
            let params = std::str::from_utf8(&bytes[1..bytes.len() - 1]).unwrap_or("");
            return match parse_csi(params, last) {
                Some(key) => Decoded::Key(key),
                None => {
                    tracing::debug!(
                        sequence = %String::from_utf8_lossy(&bytes),
                        "unknown escape sequence"
                    );
                    Decoded::Discarded
                }
            };
        }
        if bytes.len() > MAX_SEQUENCE {
            tracing::debug!(len = bytes.len(), "escape sequence too long");
            self.state = State::Skipping;
            return Decoded::Pending;
        }
        self.state = State::InSequence(bytes);
        Decoded::Pending
    }

    fn skipping(&mut self, byte: u8) -> Decoded {
        match byte {
            0x1b => {
                self.state = State::SawEscape;
                Decoded::Pending
            }
            b if is_final(b) => Decoded::Discarded,
            0x20..=0x3f => {
                self.state = State::Skipping;
                Decoded::Pending
            }
            _ => self.idle(byte),
        }
    }
}

fn is_final(byte: u8) -> bool {
    (0x40..=0x7e).contains(&byte)
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

/// `ESC O <final>`
fn parse_ss3(last: u8) -> Option<Key> {
    let key = match last {
        b'A' | b'a' => Key::Up,
        b'B' | b'b' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        // rxvt sends Ctrl+Right/Left as ESC O c / ESC O d
        b'c' => Key::CtrlRight,
        b'd' => Key::CtrlLeft,
        _ => return None,
    };
    Some(key)
}

/// Modifier bits from an xterm parameter: `1 + (shift | alt << 1 | ctrl << 2)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Modifiers {
    shift: bool,
    alt: bool,
    ctrl: bool,
}

impl Modifiers {
    fn from_param(param: Option<&str>) -> Option<Modifiers> {
        let Some(param) = param else {
            return Some(Modifiers::default());
        };
        let bits = param.parse::<u8>().ok()?.checked_sub(1)?;
        Some(Modifiers {
            shift: bits & 1 != 0,
            alt: bits & 2 != 0,
            ctrl: bits & 4 != 0,
        })
    }
}

/// `ESC [ <params> <final>`
fn parse_csi(params: &str, last: u8) -> Option<Key> {
    let mut parts = params.split(';');
    let first = parts.next().filter(|p| !p.is_empty());
    let mods = Modifiers::from_param(parts.next())?;
    if parts.next().is_some() {
        return None;
    }

    let key = match last {
        b'A' if mods.alt => Key::AltUp,
        b'A' if mods.shift => Key::ShiftUp,
        b'A' => Key::Up,
        b'B' if mods.alt => Key::AltDown,
        b'B' if mods.shift => Key::ShiftDown,
        b'B' => Key::Down,
        b'C' if mods.ctrl => Key::CtrlRight,
        b'C' if mods.alt => Key::AltRight,
        b'C' => Key::Right,
        b'D' if mods.ctrl => Key::CtrlLeft,
        b'D' if mods.alt => Key::AltLeft,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        // rxvt shifted arrows
        b'a' => Key::ShiftUp,
        b'b' => Key::ShiftDown,
        b'c' => Key::Right,
        b'd' => Key::Left,
        b'~' => match first? {
            "1" | "7" => Key::Home,
            "4" | "8" => Key::End,
            "3" => Key::Delete,
            _ => return None,
        },
        _ => return None,
    };
    Some(key)
}

/// Read codes from the surface until they form a key.
///
/// After an ESC the surface is given [`ESCAPE_WAIT`] to deliver the rest of
/// a sequence before the ESC is taken on its own.
pub fn read_key<S: Surface>(surface: &mut S, decoder: &mut KeyDecoder) -> io::Result<Key> {
    loop {
        let decoded = if decoder.is_pending() {
            match surface.next_code_within(ESCAPE_WAIT)? {
                Some(code) => decoder.feed(code),
                None => decoder.timeout(),
            }
        } else {
            decoder.feed(surface.next_code()?)
        };
        if let Decoded::Key(key) = decoded {
            return Ok(key);
        }
    }
}

/// Like [`read_key`], but gives up with None if no code starts arriving
/// within `wait`.
pub fn read_key_within<S: Surface>(
    surface: &mut S,
    decoder: &mut KeyDecoder,
    wait: Duration,
) -> io::Result<Option<Key>> {
    if !decoder.is_pending() {
        let Some(code) = surface.next_code_within(wait)? else {
            return Ok(None);
        };
        if let Decoded::Key(key) = decoder.feed(code) {
            return Ok(Some(key));
        }
    }
    read_key(surface, decoder).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codes: &[i32]) -> Vec<Decoded> {
        let mut decoder = KeyDecoder::new();
        codes.iter().map(|&c| decoder.feed(c)).collect()
    }

    fn keys(bytes: &[u8]) -> Vec<Key> {
        let mut decoder = KeyDecoder::new();
        let mut out = Vec::new();
        for &b in bytes {
            if let Decoded::Key(k) = decoder.feed(i32::from(b)) {
                out.push(k);
            }
        }
        if let Decoded::Key(k) = decoder.timeout() {
            out.push(k);
        }
        out
    }

    #[test]
    fn plain_bytes() {
        assert_eq!(
            keys(b"a Z\r\t\x7f"),
            vec![
                Key::Char('a'),
                Key::Char(' '),
                Key::Char('Z'),
                Key::Enter,
                Key::Tab,
                Key::Backspace
            ]
        );
    }

    #[test]
    fn control_letters() {
        assert_eq!(keys(b"\x01\x05\x17\x15\x0b"), vec![
            Key::Ctrl('a'),
            Key::Ctrl('e'),
            Key::Ctrl('w'),
            Key::Ctrl('u'),
            Key::Ctrl('k'),
        ]);
    }

    #[test]
    fn lone_escape_needs_timeout() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.feed(ESC), Decoded::Pending);
        assert!(decoder.is_pending());
        assert_eq!(decoder.timeout(), Decoded::Key(Key::Esc));
        assert!(!decoder.is_pending());
    }

    #[test]
    fn csi_arrows_and_home_end() {
        assert_eq!(keys(b"\x1b[A\x1b[B\x1b[C\x1b[D"), vec![
            Key::Up,
            Key::Down,
            Key::Right,
            Key::Left
        ]);
        assert_eq!(keys(b"\x1b[H\x1b[F"), vec![Key::Home, Key::End]);
        assert_eq!(keys(b"\x1b[1~\x1b[4~\x1b[7~\x1b[8~"), vec![
            Key::Home,
            Key::End,
            Key::Home,
            Key::End
        ]);
        assert_eq!(keys(b"\x1b[3~"), vec![Key::Delete]);
    }

    #[test]
    fn ss3_arrows_and_home_end() {
        assert_eq!(keys(b"\x1bOA\x1bOD\x1bOH\x1bOF"), vec![
            Key::Up,
            Key::Left,
            Key::Home,
            Key::End
        ]);
    }

    #[test]
    fn ctrl_arrows_with_parameter_block() {
        assert_eq!(keys(b"\x1b[1;5D"), vec![Key::CtrlLeft]);
        assert_eq!(keys(b"\x1b[1;5C"), vec![Key::CtrlRight]);
        assert_eq!(keys(b"\x1bOd\x1bOc"), vec![Key::CtrlLeft, Key::CtrlRight]);
    }

    #[test]
    fn shift_and_alt_arrows() {
        assert_eq!(keys(b"\x1b[1;2A\x1b[1;2B"), vec![
            Key::ShiftUp,
            Key::ShiftDown
        ]);
        assert_eq!(keys(b"\x1b[a\x1b[b"), vec![Key::ShiftUp, Key::ShiftDown]);
        assert_eq!(keys(b"\x1b[1;3A\x1b[1;3B\x1b[1;3D\x1b[1;3C"), vec![
            Key::AltUp,
            Key::AltDown,
            Key::AltLeft,
            Key::AltRight
        ]);
    }

    #[test]
    fn alt_letters() {
        assert_eq!(keys(b"\x1bb\x1bf\x1bj\x1b "), vec![
            Key::Alt('b'),
            Key::Alt('f'),
            Key::Alt('j'),
            Key::Alt(' ')
        ]);
        assert_eq!(keys(b"\x1b\x7f"), vec![Key::AltBackspace]);
    }

    #[test]
    fn unknown_sequences_are_discarded() {
        let decoded = decode_all(&[ESC, b'[' as i32, b'9' as i32, b'9' as i32, b'~' as i32]);
        assert_eq!(decoded.last(), Some(&Decoded::Discarded));
        assert_eq!(keys(b"\x1b[1;5Z"), vec![]);
        assert_eq!(keys(b"\x1b[1;2;3A"), vec![]);
    }

    #[test]
    fn decoder_recovers_after_discard() {
        assert_eq!(keys(b"\x1b[99~x"), vec![Key::Char('x')]);
    }

    #[test]
    fn partial_sequence_is_dropped_on_timeout() {
        let mut decoder = KeyDecoder::new();
        decoder.feed(ESC);
        decoder.feed(b'[' as i32);
        decoder.feed(b'1' as i32);
        assert_eq!(decoder.timeout(), Decoded::Discarded);
        assert_eq!(decoder.feed(b'q' as i32), Decoded::Key(Key::Char('q')));
    }

    #[test]
    fn overlong_sequence_is_dropped() {
        let mut bytes = b"\x1b[".to_vec();
        bytes.extend(std::iter::repeat_n(b'1', 20));
        bytes.extend(b"Ax");
        assert_eq!(keys(&bytes), vec![Key::Char('x')]);
    }

    #[test]
    fn overlong_sequence_gives_way_to_escape() {
        let mut bytes = b"\x1b[".to_vec();
        bytes.extend(std::iter::repeat_n(b';', 20));
        bytes.extend(b"\x1b[D");
        assert_eq!(keys(&bytes), vec![Key::Left]);
    }

    #[test]
    fn linux_console_function_keys_are_discarded() {
        assert_eq!(keys(b"\x1b[[Ac"), vec![Key::Char('c')]);
        assert_eq!(keys(b"\x1b[[E\x1b[[B"), vec![]);
    }

    #[test]
    fn escape_inside_ss3_starts_new_sequence() {
        assert_eq!(keys(b"\x1bO\x1b[Dc"), vec![Key::Left, Key::Char('c')]);
        assert_eq!(keys(b"\x1b[1\x1b[C"), vec![Key::Right]);
    }

    #[test]
    fn control_byte_abandons_sequence() {
        assert_eq!(keys(b"\x1b[1\r"), vec![Key::Enter]);
        assert_eq!(keys(b"\x1bO\x7f"), vec![Key::Backspace]);
        assert_eq!(keys(b"\x1b\r"), vec![Key::Enter]);
    }

    #[test]
    fn double_escape() {
        assert_eq!(keys(b"\x1b\x1b[D"), vec![Key::Esc, Key::Left]);
        assert_eq!(keys(b"\x1b\x1b"), vec![Key::Esc, Key::Esc]);
    }

    #[test]
    fn utf8_characters() {
        assert_eq!(keys("é你🎉".as_bytes()), vec![
            Key::Char('é'),
            Key::Char('你'),
            Key::Char('🎉')
        ]);
    }

    #[test]
    fn broken_utf8_keeps_the_next_key() {
        assert_eq!(keys(&[0xe4, b'a']), vec![Key::Char('a')]);
        assert_eq!(keys(&[0xe4, 0xbd, b'x', b'c']), vec![Key::Char('x'), Key::Char('c')]);
        assert_eq!(keys(&[0xc3, 0x1b, b'[', b'A']), vec![Key::Up]);
        assert_eq!(keys(&[0xff, b'b']), vec![Key::Char('b')]);
    }

    #[test]
    fn read_key_within_times_out_or_reads_whole_sequence() {
        use crate::tui::test_helpers::{PAUSE, ScriptedSurface};

        let mut surface = ScriptedSurface::new(10, 5);
        surface.push_code(PAUSE);
        surface.push_bytes(b"\x1b[B");
        let mut decoder = KeyDecoder::new();
        let wait = Duration::from_millis(100);
        assert_eq!(read_key_within(&mut surface, &mut decoder, wait).unwrap(), None);
        assert_eq!(
            read_key_within(&mut surface, &mut decoder, wait).unwrap(),
            Some(Key::Down)
        );
    }

    #[test]
    fn specials_reset_the_decoder() {
        let decoded = decode_all(&[ESC, b'[' as i32, RESIZE, b'x' as i32]);
        assert_eq!(decoded[2], Decoded::Key(Key::Resize));
        assert_eq!(decoded[3], Decoded::Key(Key::Char('x')));
        assert_eq!(decode_all(&[INTERRUPT]), vec![Decoded::Key(Key::Interrupt)]);
        assert_eq!(decode_all(&[300]), vec![Decoded::Key(Key::Special(300))]);
    }
}
