use std::fmt;

/// Outcome of a user action, rendered as the one-line status shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    NoKnownFaces,
    NoFaceInUpload,
    EmptyName,
    NoFaceInImage,
    /// Labels of every face in the photo, in detection order.
    Identified(Vec<String>),
    Added(String),
    Deleted(String),
    NotFound(String),
}

impl Status {
    pub fn deleted(name: &str, removed: usize) -> Self {
        if removed == 0 {
            Status::NotFound(name.to_string())
        } else {
            Status::Deleted(name.to_string())
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoKnownFaces => f.write_str("No known faces available"),
            Status::NoFaceInUpload => f.write_str("No face detected in the uploaded image"),
            Status::EmptyName => f.write_str("Name cannot be empty"),
            Status::NoFaceInImage => f.write_str("No face detected in the image"),
            Status::Identified(names) => write!(f, "Identified: {}", names.join(", ")),
            Status::Added(name) => write!(f, "Face for {name} added successfully!"),
            Status::Deleted(name) => write!(f, "Deleted: {name}"),
            Status::NotFound(name) => write!(f, "No face named {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(Status::NoKnownFaces.to_string(), "No known faces available");
        assert_eq!(Status::NoFaceInUpload.to_string(), "No face detected in the uploaded image");
        assert_eq!(Status::EmptyName.to_string(), "Name cannot be empty");
        assert_eq!(Status::NoFaceInImage.to_string(), "No face detected in the image");
        assert_eq!(Status::Added("Alice".into()).to_string(), "Face for Alice added successfully!");
        assert_eq!(Status::Deleted("Bob".into()).to_string(), "Deleted: Bob");
    }

    #[test]
    fn test_identified_lists_every_face() {
        let one = Status::Identified(vec!["Alice".into()]);
        assert_eq!(one.to_string(), "Identified: Alice");
        let many = Status::Identified(vec!["Alice".into(), "Unknown".into()]);
        assert_eq!(many.to_string(), "Identified: Alice, Unknown");
    }

    #[test]
    fn test_deleted_nothing() {
        assert_eq!(Status::deleted("Bob", 0), Status::NotFound("Bob".into()));
        assert_eq!(Status::deleted("Bob", 2), Status::Deleted("Bob".into()));
    }
}
