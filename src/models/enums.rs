use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Mode {
    Create => "create",
    Cancel => "cancel",
    Schedule => "schedule",
});

str_enum!(AppointmentStatus {
    Pending => "pending",
    Scheduled => "scheduled",
    Cancelled => "cancelled",
});

str_enum!(FormField {
    PrimaryPhysician => "primaryPhysician",
    Schedule => "schedule",
    Reason => "reason",
    Note => "note",
    CancellationReason => "cancellationReason",
});

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Create, Mode::Cancel, Mode::Schedule];

    /// Status the backend records for an appointment submitted in this mode.
    pub fn status(self) -> AppointmentStatus {
        match self {
            Mode::Schedule => AppointmentStatus::Scheduled,
            Mode::Cancel => AppointmentStatus::Cancelled,
            Mode::Create => AppointmentStatus::Pending,
        }
    }
}
