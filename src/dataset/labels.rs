// ClassLabelMap - bijection between class names and integer labels

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Fixed mapping between class names and codes `0..len()`
///
/// The position of a name in the list passed to [`ClassLabelMap::new`] is its
/// code. The map never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassLabelMap {
    names: Vec<String>,
    #[serde(skip)]
    codes: HashMap<String, usize>,
}

impl ClassLabelMap {
    /// Build a label map from class names in code order
    ///
    /// # Errors
    /// - `DatasetError::EmptyClassMap` when `names` is empty
    /// - `DatasetError::DuplicateClass` for a repeated or empty name
    pub fn new<I, S>(names: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(DatasetError::EmptyClassMap);
        }

        let mut codes = HashMap::with_capacity(names.len());
        for (code, name) in names.iter().enumerate() {
            if name.trim().is_empty() || codes.insert(name.clone(), code).is_some() {
                return Err(DatasetError::DuplicateClass { name: name.clone() });
            }
        }

        Ok(Self { names, codes })
    }

    /// Code of a class name
    pub fn code(&self, name: &str) -> Result<usize, DatasetError> {
        self.codes
            .get(name)
            .copied()
            .ok_or_else(|| DatasetError::UnknownClass {
                name: name.to_string(),
            })
    }

    /// Name of a class code
    pub fn name(&self, code: usize) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// First class (in code order) whose name occurs in the file stem
    ///
    /// Matching is case-insensitive on the stem only, so directory names
    /// never influence the guess.
    pub fn guess_from_filename<P: AsRef<Path>>(&self, path: P) -> Option<usize> {
        let stem = path.as_ref().file_stem()?.to_string_lossy().to_lowercase();
        self.names
            .iter()
            .position(|name| stem.contains(&name.to_lowercase()))
    }
}

impl TryFrom<Vec<String>> for ClassLabelMap {
    type Error = DatasetError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<ClassLabelMap> for Vec<String> {
    fn from(map: ClassLabelMap) -> Self {
        map.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> ClassLabelMap {
        ClassLabelMap::new(["apple", "banana", "orange", "pear"]).unwrap()
    }

    #[test]
    fn test_codes_follow_order() {
        let map = fruits();
        assert_eq!(map.len(), 4);
        assert_eq!(map.code("apple").unwrap(), 0);
        assert_eq!(map.code("pear").unwrap(), 3);
        assert_eq!(map.name(2), Some("orange"));
        assert_eq!(map.name(4), None);
        assert_eq!(
            map.code("kiwi"),
            Err(DatasetError::UnknownClass {
                name: "kiwi".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(matches!(
            ClassLabelMap::new(["apple", "apple"]),
            Err(DatasetError::DuplicateClass { .. })
        ));
        assert!(matches!(
            ClassLabelMap::new(["apple", " "]),
            Err(DatasetError::DuplicateClass { .. })
        ));
        assert_eq!(
            ClassLabelMap::new(Vec::<String>::new()),
            Err(DatasetError::EmptyClassMap)
        );
    }

    #[test]
    fn test_guess_from_filename() {
        let map = fruits();
        assert_eq!(map.guess_from_filename("/data/Banana_take3.wav"), Some(1));
        assert_eq!(map.guess_from_filename("pear-02.wav"), Some(3));
        assert_eq!(map.guess_from_filename("/apple/recording.wav"), None);
        assert_eq!(map.guess_from_filename("kiwi.wav"), None);
    }

    #[test]
    fn test_serde_as_name_list() {
        let map = fruits();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"["apple","banana","orange","pear"]"#);
        let back: ClassLabelMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert!(serde_json::from_str::<ClassLabelMap>(r#"["a","a"]"#).is_err());
    }
}
