use thiserror::Error;

use crate::model::ids::CategoryId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category name cannot be empty")]
    EmptyName,
}

/// A named grouping of quiz questions.
///
/// Categories are created once at seed time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
}

impl Category {
    /// Creates a new Category.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` if the name is empty or
    /// whitespace-only.
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, CategoryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CategoryError::EmptyName);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            description,
        })
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_rejects_empty_name() {
        let err = Category::new(CategoryId::new(1), "   ", None).unwrap_err();
        assert_eq!(err, CategoryError::EmptyName);
    }

    #[test]
    fn category_trims_fields() {
        let cat = Category::new(
            CategoryId::new(1),
            "  Mathematics  ",
            Some("  arithmetic drills  ".into()),
        )
        .unwrap();

        assert_eq!(cat.name(), "Mathematics");
        assert_eq!(cat.description(), Some("arithmetic drills"));
    }

    #[test]
    fn category_filters_blank_description() {
        let cat = Category::new(CategoryId::new(2), "Science", Some("   ".into())).unwrap();
        assert_eq!(cat.description(), None);
    }
}
