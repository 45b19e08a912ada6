use crate::resolver::file_word;

/// the staged files a message is generated for, with their diff
#[derive(Debug)]
pub struct ChangeSet {
    pub files: Vec<String>,
    pub diff: String,
}

impl ChangeSet {
    /// eg "3 staged files"
    pub fn describe(&self) -> String {
        format!("{} staged {}", self.files.len(), file_word(self.files.len()))
    }
}
