//! # Classes
//!
//! The set of segmentation classes, each with an id and the color it is painted in.
//! Loaded from a JSON document of the shape `{"classes": [{"id": 1, "name": "leaf", "color": "#00ff00"}]}`.

use crate::color::{Color, ColorParseError};

#[derive(thiserror::Error, Debug)]
pub enum ClassListError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("class {id} has invalid color {color:?}: {source}")]
    Color {
        id: u32,
        color: String,
        source: ColorParseError,
    },
    #[error("class id {0} is used more than once")]
    DuplicateId(u32),
    #[error("no classes defined")]
    Empty,
}

/// On-disk form, before colors are validated.
#[derive(serde::Deserialize)]
struct RawClassList {
    classes: Vec<RawClass>,
}
#[derive(serde::Deserialize)]
struct RawClass {
    id: u32,
    name: String,
    color: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    pub id: u32,
    pub name: String,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassList {
    /// In file order.
    classes: Vec<Class>,
}
impl ClassList {
    /// # Errors
    /// Malformed JSON, unparsable colors, duplicate ids, or no classes at all.
    pub fn from_json(json: &str) -> Result<Self, ClassListError> {
        let raw: RawClassList = serde_json::from_str(json)?;
        if raw.classes.is_empty() {
            return Err(ClassListError::Empty);
        }
        let mut classes: Vec<Class> = Vec::with_capacity(raw.classes.len());
        for RawClass { id, name, color } in raw.classes {
            if classes.iter().any(|class| class.id == id) {
                return Err(ClassListError::DuplicateId(id));
            }
            let parsed = color.parse().map_err(|source| ClassListError::Color {
                id,
                color: color.clone(),
                source,
            })?;
            classes.push(Class {
                id,
                name,
                color: parsed,
            });
        }
        Ok(Self { classes })
    }
    /// # Errors
    /// See [`ClassList::from_json`], plus any I/O error.
    pub fn open(path: &std::path::Path) -> Result<Self, ClassListError> {
        let list = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::debug!("loaded {} classes from {path:?}", list.len());
        Ok(list)
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Class> {
        self.classes.iter().find(|class| class.id == id)
    }
    /// The class picked by number key `digit`, if it names one. Only `1..=9` are shortcuts.
    #[must_use]
    pub fn for_shortcut(&self, digit: u8) -> Option<&Class> {
        if (1..=9).contains(&digit) {
            self.get(u32::from(digit))
        } else {
            None
        }
    }
    /// The class selected when a session starts.
    #[must_use]
    pub fn first(&self) -> Option<&Class> {
        self.classes.first()
    }
}

#[cfg(test)]
mod test {
    use super::{ClassList, ClassListError};
    use crate::color::Color;

    const CLASSES: &str = r##"{
        "classes": [
            {"id": 1, "name": "background", "color": "#000000"},
            {"id": 2, "name": "leaf", "color": "#00ff00"},
            {"id": 12, "name": "stem", "color": "brown-ish"}
        ]
    }"##;

    #[test]
    fn load() {
        let json = CLASSES.replace("brown-ish", "#8b4513");
        let list = ClassList::from_json(&json).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.first().map(|c| c.name.as_str()), Some("background"));
        assert_eq!(list.for_shortcut(2).map(|c| c.color), Some(Color::rgb(0, 255, 0)));
        // Exists, but isn't a digit.
        assert!(list.get(12).is_some());
        assert!(list.for_shortcut(12).is_none());
        assert!(list.for_shortcut(0).is_none());
        assert!(list.for_shortcut(3).is_none());

        // Colors keep their parsed value, names and order are untouched.
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["background", "leaf", "stem"]);
        assert_eq!(list.get(12).map(|c| c.color), Some(Color::rgb(0x8b, 0x45, 0x13)));
    }

    #[test]
    fn bad_color() {
        assert!(matches!(
            ClassList::from_json(CLASSES),
            Err(ClassListError::Color { id: 12, .. })
        ));
    }

    #[test]
    fn duplicate_and_empty() {
        let dup = r##"{"classes": [{"id": 1, "name": "a", "color": "red"}, {"id": 1, "name": "b", "color": "blue"}]}"##;
        assert!(matches!(
            ClassList::from_json(dup),
            Err(ClassListError::DuplicateId(1))
        ));
        assert!(matches!(
            ClassList::from_json(r#"{"classes": []}"#),
            Err(ClassListError::Empty)
        ));
        assert!(matches!(
            ClassList::from_json("{"),
            Err(ClassListError::Json(_))
        ));
    }
}
