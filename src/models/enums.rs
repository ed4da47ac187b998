use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ResourceKind {
    Patient => "patient",
    Report => "report",
    Observation => "observation",
    Original => "original",
});

str_enum!(Interpretation {
    Normal => "normal",
    Low => "low",
    High => "high",
    Unknown => "unknown",
});

impl Interpretation {
    /// Whether the flag marks a value outside its reference range.
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::Low | Self::High)
    }
}

str_enum!(TrendDirection {
    Up => "up",
    Down => "down",
    Same => "same",
    New => "new",
    Discontinued => "discontinued",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn resource_kind_round_trip() {
        for (variant, s) in [
            (ResourceKind::Patient, "patient"),
            (ResourceKind::Report, "report"),
            (ResourceKind::Observation, "observation"),
            (ResourceKind::Original, "original"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ResourceKind::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn interpretation_round_trip() {
        for (variant, s) in [
            (Interpretation::Normal, "normal"),
            (Interpretation::Low, "low"),
            (Interpretation::High, "high"),
            (Interpretation::Unknown, "unknown"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Interpretation::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn trend_direction_round_trip() {
        for (variant, s) in [
            (TrendDirection::Up, "up"),
            (TrendDirection::Down, "down"),
            (TrendDirection::Same, "same"),
            (TrendDirection::New, "new"),
            (TrendDirection::Discontinued, "discontinued"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(TrendDirection::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn abnormal_detection() {
        assert!(Interpretation::Low.is_abnormal());
        assert!(Interpretation::High.is_abnormal());
        assert!(!Interpretation::Normal.is_abnormal());
        assert!(!Interpretation::Unknown.is_abnormal());
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(ResourceKind::from_str("invalid").is_err());
        assert!(Interpretation::from_str("abnormal").is_err());
        assert!(TrendDirection::from_str("").is_err());
    }
}
