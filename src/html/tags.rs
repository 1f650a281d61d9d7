/// Which elements carry mirrored references, and in which attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTable {
    entries: Vec<TagEntry>,
}

/// One element/attribute pair of the tag table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    /// Lowercase element name
    pub element: &'static str,
    /// Lowercase name of the attribute holding the reference
    pub attribute: &'static str,
}

impl TagTable {
    /// Builds a table from explicit entries
    pub fn new(entries: Vec<TagEntry>) -> Self {
        Self { entries }
    }

    /// Returns the reference attribute for an element name, if it is tracked
    pub fn attribute_for(&self, element: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.element.eq_ignore_ascii_case(element))
            .map(|entry| entry.attribute)
    }

    /// CSS selector group matching every tracked element that has its attribute
    pub fn selector(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}[{}]", entry.element, entry.attribute))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::new(vec![
            TagEntry {
                element: "link",
                attribute: "href",
            },
            TagEntry {
                element: "script",
                attribute: "src",
            },
            TagEntry {
                element: "img",
                attribute: "src",
            },
        ])
    }
}
