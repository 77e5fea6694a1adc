// Command interpreter: datagram payload -> motion intent
//
// Two symbol sets are supported. `Basic` treats the trimmed payload as a
// whole token; `Extended` looks only at the first byte and ignores the rest.

use clap::ValueEnum;

use crate::messages::MotionIntent;

/// F/B/L/R drive, S stop, +/- speed
const BASIC: &[(u8, MotionIntent)] = &[
    (b'F', MotionIntent::Forward),
    (b'B', MotionIntent::Backward),
    (b'L', MotionIntent::TurnLeft),
    (b'R', MotionIntent::TurnRight),
    (b'S', MotionIntent::Stop),
    (b'+', MotionIntent::SpeedUp),
    (b'-', MotionIntent::SpeedDown),
];

/// Adds the four diagonal pivots; backward and right turn move to K and E
const EXTENDED: &[(u8, MotionIntent)] = &[
    (b'F', MotionIntent::Forward),
    (b'K', MotionIntent::Backward),
    (b'L', MotionIntent::TurnLeft),
    (b'E', MotionIntent::TurnRight),
    (b'R', MotionIntent::PivotForwardLeft),
    (b'Y', MotionIntent::PivotForwardRight),
    (b'C', MotionIntent::PivotBackwardLeft),
    (b'B', MotionIntent::PivotBackwardRight),
    (b'S', MotionIntent::Stop),
    (b'+', MotionIntent::SpeedUp),
    (b'-', MotionIntent::SpeedDown),
];

/// Symbol set understood by the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Vocabulary {
    Basic,
    #[default]
    Extended,
}

impl Vocabulary {
    pub fn table(self) -> &'static [(u8, MotionIntent)] {
        match self {
            Self::Basic => BASIC,
            Self::Extended => EXTENDED,
        }
    }

    /// Look up a single symbol. Unknown symbols are `NoOp`.
    pub fn lookup(self, symbol: u8) -> MotionIntent {
        self.table()
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, intent)| *intent)
            .unwrap_or(MotionIntent::NoOp)
    }

    /// Decode one datagram payload into exactly one intent
    pub fn decode(self, payload: &[u8]) -> MotionIntent {
        match self {
            Self::Basic => match payload.trim_ascii() {
                [symbol] => self.lookup(*symbol),
                _ => MotionIntent::NoOp,
            },
            Self::Extended => match payload.first() {
                Some(&symbol) => self.lookup(symbol),
                None => MotionIntent::NoOp,
            },
        }
    }

    /// Reverse lookup used by controllers to encode an intent
    pub fn symbol_for(self, intent: MotionIntent) -> Option<u8> {
        self.table()
            .iter()
            .find(|(_, i)| *i == intent)
            .map(|(s, _)| *s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_vocabulary() {
        let v = Vocabulary::Basic;
        assert_eq!(v.decode(b"F"), MotionIntent::Forward);
        assert_eq!(v.decode(b"B"), MotionIntent::Backward);
        assert_eq!(v.decode(b"L"), MotionIntent::TurnLeft);
        assert_eq!(v.decode(b"R"), MotionIntent::TurnRight);
        assert_eq!(v.decode(b"S"), MotionIntent::Stop);
        assert_eq!(v.decode(b"+"), MotionIntent::SpeedUp);
        assert_eq!(v.decode(b"-"), MotionIntent::SpeedDown);
    }

    #[test]
    fn test_extended_vocabulary() {
        let v = Vocabulary::Extended;
        assert_eq!(v.decode(b"F"), MotionIntent::Forward);
        assert_eq!(v.decode(b"K"), MotionIntent::Backward);
        assert_eq!(v.decode(b"L"), MotionIntent::TurnLeft);
        assert_eq!(v.decode(b"E"), MotionIntent::TurnRight);
        assert_eq!(v.decode(b"R"), MotionIntent::PivotForwardLeft);
        assert_eq!(v.decode(b"Y"), MotionIntent::PivotForwardRight);
        assert_eq!(v.decode(b"C"), MotionIntent::PivotBackwardLeft);
        assert_eq!(v.decode(b"B"), MotionIntent::PivotBackwardRight);
        assert_eq!(v.decode(b"S"), MotionIntent::Stop);
    }

    #[test]
    fn test_basic_trims_but_requires_exact_token() {
        let v = Vocabulary::Basic;
        assert_eq!(v.decode(b"  F\r\n"), MotionIntent::Forward);
        assert_eq!(v.decode(b"FF"), MotionIntent::NoOp);
        assert_eq!(v.decode(b"Forward"), MotionIntent::NoOp);
        assert_eq!(v.decode(b"   "), MotionIntent::NoOp);
    }

    #[test]
    fn test_extended_ignores_trailing_bytes() {
        let v = Vocabulary::Extended;
        assert_eq!(v.decode(b"F\0"), MotionIntent::Forward);
        assert_eq!(v.decode(b"Kxyz"), MotionIntent::Backward);
        // no whitespace tolerance: the first byte is authoritative
        assert_eq!(v.decode(b" F"), MotionIntent::NoOp);
    }

    #[test]
    fn test_unknown_and_empty_are_noop() {
        for v in [Vocabulary::Basic, Vocabulary::Extended] {
            assert_eq!(v.decode(b""), MotionIntent::NoOp);
            assert_eq!(v.decode(b"f"), MotionIntent::NoOp, "no case folding");
            assert_eq!(v.decode(b"X"), MotionIntent::NoOp);
            assert_eq!(v.decode(&[0xFF]), MotionIntent::NoOp);
        }
        assert_eq!(Vocabulary::Basic.decode(b"Y"), MotionIntent::NoOp);
        assert_eq!(Vocabulary::Extended.decode(b"?"), MotionIntent::NoOp);
    }

    #[test]
    fn test_every_byte_maps_to_exactly_one_intent() {
        for v in [Vocabulary::Basic, Vocabulary::Extended] {
            for byte in 0..=u8::MAX {
                let hits = v.table().iter().filter(|(s, _)| *s == byte).count();
                assert!(hits <= 1, "symbol {byte} listed twice");
                if hits == 0 {
                    assert_eq!(v.lookup(byte), MotionIntent::NoOp);
                }
            }
        }
    }

    #[test]
    fn test_symbol_round_trip() {
        for v in [Vocabulary::Basic, Vocabulary::Extended] {
            for &(symbol, intent) in v.table() {
                assert_eq!(v.symbol_for(intent), Some(symbol));
            }
            assert_eq!(v.symbol_for(MotionIntent::NoOp), None);
        }
        assert_eq!(Vocabulary::Basic.symbol_for(MotionIntent::PivotForwardLeft), None);
    }
}
