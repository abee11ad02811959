//! Interactive menu over the catalog, driven by any line-based input.

use crate::catalog::Catalog;
use crate::live::{LiveOptions, LiveReporter, StopSignal};
use crate::status::Status;
use anyhow::{Context, Result};
use facecat_core::FaceEncoder;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const MENU: &str = "\
  1) Upload Image
  2) Add New Face
  3) Delete Face
  4) Live Recognition
  q) Quit";

/// Where and how the Live Recognition entry captures.
pub struct LiveSettings {
    pub device: String,
    pub snapshot: Option<PathBuf>,
    pub stop: StopSignal,
}

pub struct Shell<'a, E, R, W> {
    catalog: &'a mut Catalog<E>,
    live: LiveSettings,
    input: R,
    output: W,
    status: String,
}

impl<'a, E, R, W> Shell<'a, E, R, W>
where
    E: FaceEncoder + Send,
    R: BufRead,
    W: Write,
{
    pub fn new(catalog: &'a mut Catalog<E>, live: LiveSettings, input: R, output: W) -> Self {
        Self {
            catalog,
            live,
            input,
            output,
            status: "Ready".to_string(),
        }
    }

    /// Show the menu until the user quits or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "{} known faces | {}", self.catalog.known().len(), self.status)?;
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };

            let outcome = match choice.as_str() {
                "1" => self.upload(),
                "2" => self.add(),
                "3" => self.delete(),
                "4" => self.live(),
                "q" | "Q" => break,
                "" => continue,
                other => {
                    self.status = format!("Unknown choice: {other}");
                    continue;
                }
            };
            match outcome {
                Ok(Some(status)) => self.status = status.to_string(),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("shell action failed: {e:#}");
                    self.status = format!("error: {e:#}");
                }
            }
        }
        writeln!(self.output, "Bye")?;
        Ok(())
    }

    fn upload(&mut self) -> Result<Option<Status>> {
        let Some(path) = self.prompt("Image path: ")? else {
            return Ok(None);
        };
        let path = PathBuf::from(path);
        writeln!(self.output, "Preview: {}", preview(&path)?)?;

        match self.prompt("Identify this image? [y/N] ")? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => self.catalog.identify(&path).map(Some),
            _ => {
                self.status = "Upload cancelled".to_string();
                Ok(None)
            }
        }
    }

    fn add(&mut self) -> Result<Option<Status>> {
        let Some(path) = self.prompt("Image path: ")? else {
            return Ok(None);
        };
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(None);
        };
        self.catalog.add(&name, Path::new(&path)).map(Some)
    }

    fn delete(&mut self) -> Result<Option<Status>> {
        let mut names: Vec<String> = Vec::new();
        for name in self.catalog.known().names() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        if names.is_empty() {
            return Ok(Some(Status::NoKnownFaces));
        }

        for (i, name) in names.iter().enumerate() {
            writeln!(self.output, "  {}) {name}", i + 1)?;
        }
        let Some(answer) = self.prompt("Delete which face? ")? else {
            return Ok(None);
        };
        match answer.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| names.get(i)) {
            Some(name) => self.catalog.delete(name).map(Some),
            None => {
                self.status = format!("Invalid selection: {answer}");
                Ok(None)
            }
        }
    }

    fn live(&mut self) -> Result<Option<Status>> {
        writeln!(self.output, "Live recognition on {}, press Ctrl-C to stop", self.live.device)?;
        let options = LiveOptions {
            max_frames: None,
            annotate: self.live.snapshot.is_some(),
        };
        let mut reporter = LiveReporter::new(&mut self.output, self.live.snapshot.clone());
        let summary = self
            .catalog
            .live_camera(&self.live.device, &self.live.stop, &options, &mut reporter)?;
        self.status = format!("Live recognition {} after {} frames", summary.end, summary.frames);
        Ok(None)
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Dimensions and detected format of the image at `path`.
fn preview(path: &Path) -> Result<String> {
    let reader = image::ImageReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .with_guessed_format()?;
    let format = reader
        .format()
        .map(|f| format!("{f:?}").to_uppercase())
        .unwrap_or_else(|| "unknown format".to_string());
    let (width, height) = reader
        .into_dimensions()
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(format!("{width}x{height} {format}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{face_box, write_photo};
    use facecat_core::pipeline::testing::ScriptedEncoder;
    use facecat_store::FaceStore;
    use std::io::Cursor;

    fn settings() -> LiveSettings {
        LiveSettings {
            device: "/nonexistent/video9".into(),
            snapshot: None,
            stop: StopSignal::new(),
        }
    }

    fn run_shell(catalog: &mut Catalog<ScriptedEncoder>, script: &str) -> String {
        let mut out = Vec::new();
        Shell::new(catalog, settings(), Cursor::new(script.to_string()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn catalog() -> Catalog<ScriptedEncoder> {
        Catalog::new(
            FaceStore::open_in_memory().unwrap(),
            ScriptedEncoder::with_vectors(vec![(face_box(2.0), vec![1.0, 0.0])]),
        )
    }

    #[test]
    fn test_add_and_upload_flow() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_photo(dir.path(), "alice.png");
        let path = photo.display();
        let mut catalog = catalog();

        let out = run_shell(&mut catalog, &format!("2\n{path}\nAlice\n1\n{path}\ny\nq\n"));

        assert!(out.contains("Face for Alice added successfully!"));
        assert!(out.contains("Preview: 32x24 PNG"));
        assert!(out.contains("1 known faces | Identified: Alice"));
        assert!(out.trim_end().ends_with("Bye"));
    }

    #[test]
    fn test_upload_declined_keeps_catalog_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_photo(dir.path(), "alice.png");
        let mut catalog = catalog();

        let out = run_shell(&mut catalog, &format!("1\n{}\nn\nq\n", photo.display()));

        assert!(out.contains("Upload cancelled"));
        assert_eq!(catalog.encoder().detect_calls, 0);
    }

    #[test]
    fn test_blank_name_shows_status() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_photo(dir.path(), "alice.png");
        let mut catalog = catalog();

        let out = run_shell(&mut catalog, &format!("2\n{}\n   \nq\n", photo.display()));

        assert!(out.contains("0 known faces | Name cannot be empty"));
    }

    #[test]
    fn test_delete_by_number() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_photo(dir.path(), "p.png");
        let mut catalog = catalog();
        catalog.add("Alice", &photo).unwrap();
        catalog.add("Bob", &photo).unwrap();
        catalog.add("Alice", &photo).unwrap();

        let out = run_shell(&mut catalog, "3\n2\nq\n");

        assert!(out.contains("  1) Alice\n  2) Bob\n"));
        assert!(out.contains("Deleted: Bob"));
        assert_eq!(catalog.known().names().collect::<Vec<_>>(), ["Alice", "Alice"]);
    }

    #[test]
    fn test_delete_invalid_selection() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_photo(dir.path(), "p.png");
        let mut catalog = catalog();
        catalog.add("Alice", &photo).unwrap();

        let out = run_shell(&mut catalog, "3\n7\nq\n");

        assert!(out.contains("Invalid selection: 7"));
        assert_eq!(catalog.known().len(), 1);
    }

    #[test]
    fn test_delete_on_empty_catalog() {
        let out = run_shell(&mut catalog(), "3\nq\n");
        assert!(out.contains("No known faces available"));
    }

    #[test]
    fn test_errors_keep_shell_running() {
        let out = run_shell(&mut catalog(), "2\n/nonexistent/photo.png\nAlice\n4\nq\n");

        assert!(out.contains("| error: failed to load /nonexistent/photo.png"));
        assert!(out.contains("| error: failed to open camera /nonexistent/video9"));
        assert!(out.trim_end().ends_with("Bye"));
    }

    #[test]
    fn test_end_of_input_quits() {
        let out = run_shell(&mut catalog(), "x\n");
        assert!(out.contains("Unknown choice: x"));
        assert!(out.trim_end().ends_with("Bye"));
    }
}
