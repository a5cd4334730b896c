use serde::{Deserialize, Serialize};

/// A doctor the patient can pick on the form. `name` doubles as the
/// physician reference sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physician {
    pub name: String,
    pub image: String,
}

impl Physician {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }
}

pub const DEFAULT_PHYSICIANS: &[(&str, &str)] = &[
    ("John Green", "/assets/images/dr-green.png"),
    ("Leila Cameron", "/assets/images/dr-cameron.png"),
    ("David Livingston", "/assets/images/dr-livingston.png"),
    ("Evan Peter", "/assets/images/dr-peter.png"),
    ("Jane Powell", "/assets/images/dr-powell.png"),
    ("Alex Ramirez", "/assets/images/dr-remirez.png"),
    ("Jasmine Lee", "/assets/images/dr-lee.png"),
    ("Alyana Cruz", "/assets/images/dr-cruz.png"),
    ("Hardik Sharma", "/assets/images/dr-sharma.png"),
];

pub fn default_physicians() -> Vec<Physician> {
    DEFAULT_PHYSICIANS
        .iter()
        .map(|(name, image)| Physician::new(*name, *image))
        .collect()
}
