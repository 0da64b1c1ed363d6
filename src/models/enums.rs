use serde::{Deserialize, Serialize};

/// Raised when a stored or user-supplied string names no enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
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

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ClassificationStatus {
    Low => "low",
    Normal => "normal",
    High => "high",
    Unknown => "unknown",
});

str_enum!(Sex {
    Male => "male",
    Female => "female",
    Other => "other",
});

impl std::fmt::Display for ClassificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Normal => write!(f, "Normal"),
            Self::High => write!(f, "High"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ClassificationStatus::Low,
            ClassificationStatus::Normal,
            ClassificationStatus::High,
            ClassificationStatus::Unknown,
        ] {
            assert_eq!(status.as_str().parse::<ClassificationStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_sex_string_is_rejected() {
        let err = "robot".parse::<Sex>().unwrap_err();
        assert_eq!(err.field, "Sex");
        assert_eq!(err.value, "robot");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"female\"");
        let status: ClassificationStatus = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(status, ClassificationStatus::High);
    }

    #[test]
    fn status_display_is_capitalized() {
        assert_eq!(ClassificationStatus::Normal.to_string(), "Normal");
        assert_eq!(ClassificationStatus::Unknown.to_string(), "Unknown");
    }
}
