//! Function keys (§2.3.6)
//!
//! A function key arrives as [`SEP`](crate::protocol::codes::SEP) followed
//! by one code byte.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKey {
    Envoi,
    Retour,
    Repetition,
    Guide,
    Annulation,
    Sommaire,
    Correction,
    Suite,
    ConnexionFin,
    ShiftConnexionFin,
    /// Second step of the power-on sequence. Never produced by [`FunctionKey::from_code`].
    TurnOn2,
    /// Third step of the power-on sequence. Never produced by [`FunctionKey::from_code`].
    TurnOn3,
    Unknown(u8),
}

const KNOWN_KEYS: [FunctionKey; 10] = [
    FunctionKey::Envoi,
    FunctionKey::Retour,
    FunctionKey::Repetition,
    FunctionKey::Guide,
    FunctionKey::Annulation,
    FunctionKey::Sommaire,
    FunctionKey::Correction,
    FunctionKey::Suite,
    FunctionKey::ConnexionFin,
    FunctionKey::ShiftConnexionFin,
];

impl FunctionKey {
    /// Key for a code byte. Total: unknown codes map to `Unknown`.
    pub fn from_code(code: u8) -> Self {
        KNOWN_KEYS
            .into_iter()
            .find(|key| key.code() == code)
            .unwrap_or(FunctionKey::Unknown(code))
    }

    pub const fn code(self) -> u8 {
        match self {
            FunctionKey::Envoi => 0x41,
            FunctionKey::Retour => 0x42,
            FunctionKey::Repetition => 0x43,
            FunctionKey::Guide => 0x44,
            FunctionKey::Annulation => 0x45,
            FunctionKey::Sommaire => 0x46,
            FunctionKey::Correction => 0x47,
            FunctionKey::Suite => 0x48,
            FunctionKey::ShiftConnexionFin => 0x49,
            // §1.5.3.1.1
            FunctionKey::ConnexionFin => 0x59,
            FunctionKey::TurnOn2 => 0x53,
            FunctionKey::TurnOn3 => 0x54,
            FunctionKey::Unknown(code) => code,
        }
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FunctionKey::Envoi => "ENVOI",
            FunctionKey::Retour => "RETOUR",
            FunctionKey::Repetition => "REPETITION",
            FunctionKey::Guide => "GUIDE",
            FunctionKey::Annulation => "ANNULATION",
            FunctionKey::Sommaire => "SOMMAIRE",
            FunctionKey::Correction => "CORRECTION",
            FunctionKey::Suite => "SUITE",
            FunctionKey::ConnexionFin => "CONNEXION_FIN",
            FunctionKey::ShiftConnexionFin => "SHIFT_CONNEXION_FIN",
            FunctionKey::TurnOn2 => "TURN_ON_2",
            FunctionKey::TurnOn3 => "TURN_ON_3",
            FunctionKey::Unknown(code) => return write!(f, "UNKNOWN({code:02x})"),
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(FunctionKey::from_code(0x41), FunctionKey::Envoi);
        assert_eq!(FunctionKey::from_code(0x48), FunctionKey::Suite);
        assert_eq!(FunctionKey::from_code(0x49), FunctionKey::ShiftConnexionFin);
        assert_eq!(FunctionKey::from_code(0x59), FunctionKey::ConnexionFin);
        for key in KNOWN_KEYS {
            assert_eq!(FunctionKey::from_code(key.code()), key);
        }
    }

    #[test]
    fn test_unknown_codes_carry_the_byte() {
        assert_eq!(FunctionKey::from_code(0x00), FunctionKey::Unknown(0x00));
        assert_eq!(FunctionKey::from_code(0x53), FunctionKey::Unknown(0x53));
        assert_eq!(FunctionKey::from_code(0x54), FunctionKey::Unknown(0x54));
        assert_eq!(FunctionKey::Unknown(0x7F).code(), 0x7F);
    }

    #[test]
    fn test_display() {
        assert_eq!(FunctionKey::Envoi.to_string(), "ENVOI");
        assert_eq!(FunctionKey::Unknown(0x3c).to_string(), "UNKNOWN(3c)");
    }
}
