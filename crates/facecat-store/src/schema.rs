pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS known_faces (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    encoding   BLOB NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_known_faces_name ON known_faces(name);
"#;

pub(crate) const SELECT_ALL: &str =
    "SELECT id, name, encoding, created_at FROM known_faces ORDER BY id";

pub(crate) const INSERT: &str =
    "INSERT INTO known_faces (name, encoding, created_at) VALUES (?1, ?2, ?3)";

pub(crate) const DELETE_BY_NAME: &str = "DELETE FROM known_faces WHERE name = ?1";
