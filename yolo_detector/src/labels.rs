use crate::error::DetectorError;
use image::Rgb;
use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLabel {
    pub label: String,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorLabel {
    pub fn color(&self) -> Rgb<u8> {
        Rgb([self.red, self.green, self.blue])
    }
}

/// Class id to label lookup, indexed by the model's class dimension.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    class_labels: Vec<ColorLabel>,
}

impl LabelTable {
    pub fn new(class_labels: Vec<ColorLabel>) -> Self {
        Self { class_labels }
    }

    /// A file without a single label is rejected: every class id would
    /// decode as unknown.
    pub fn load(filepath: &Path) -> Result<Self, DetectorError> {
        let table = load_yolov8_labels(filepath)
            .map(Self::new)
            .map_err(|e| DetectorError::Labels(format!("{}: {}", filepath.display(), e)))?;
        if table.is_empty() {
            return Err(DetectorError::Labels(format!(
                "{}: no class labels",
                filepath.display()
            )));
        }
        Ok(table)
    }

    pub fn get(&self, class_id: u32) -> Option<&ColorLabel> {
        self.class_labels.get(class_id as usize)
    }

    pub fn label_for(&self, class_id: u32) -> String {
        match self.get(class_id) {
            Some(color_label) => color_label.label.clone(),
            None => format!("Unknown class {}", class_id),
        }
    }

    pub fn color_for(&self, class_id: u32) -> Rgb<u8> {
        self.get(class_id)
            .map(ColorLabel::color)
            .unwrap_or(Rgb([0, 0, 0]))
    }

    pub fn len(&self) -> usize {
        self.class_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_labels.is_empty()
    }
}

fn parse_channel(value: &str, name: &str) -> io::Result<u8> {
    value
        .trim()
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid {} value", name)))
}

pub fn load_yolov8_labels(filepath: &Path) -> io::Result<Vec<ColorLabel>> {
    let file = File::open(filepath)?;
    let reader = io::BufReader::new(file);
    let mut color_labels = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(',').collect();

        if parts.len() == 4 {
            color_labels.push(ColorLabel {
                label: parts[0].trim().to_string(),
                red: parse_channel(parts[1], "red")?,
                green: parse_channel(parts[2], "green")?,
                blue: parse_channel(parts[3], "blue")?,
            });
        } else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid line format: {}", line),
            ));
        }
    }

    Ok(color_labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "person, 255, 0, 0").unwrap();
        writeln!(file, "bicycle,0,255,0").unwrap();
        writeln!(file).unwrap();

        let table = LabelTable::load(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.label_for(0), "person");
        assert_eq!(table.color_for(1), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_unknown_class_falls_back() {
        let table = LabelTable::default();

        assert_eq!(table.label_for(42), "Unknown class 42");
        assert_eq!(table.color_for(42), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_rejects_file_without_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file).unwrap();

        let err = LabelTable::load(file.path()).unwrap_err();
        assert!(matches!(err, DetectorError::Labels(_)));
    }

    #[test]
    fn test_rejects_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "person,255,0").unwrap();

        let err = load_yolov8_labels(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_rejects_out_of_range_channel() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "person,300,0,0").unwrap();

        assert!(load_yolov8_labels(file.path()).is_err());
    }
}
