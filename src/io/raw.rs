/// Read / write float arrays as raw little-endian binary

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

pub fn write(data: impl Iterator<Item = f32>, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() { std::fs::create_dir_all(dir)?; }
    }
    let mut buf = BufWriter::new(File::create(path)?);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

type IORes<T> = std::io::Result<T>;

/// Lazily read `f32`s until the end of the file. A trailing partial value is
/// reported as an error rather than silently dropped.
pub fn read<'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<f32>> + 'a> {
    let mut buf = BufReader::new(File::open(path)?);
    let mut done = false;

    Ok(std::iter::from_fn(move || {
        if done { return None; }
        let mut buffer = [0; 4];
        let mut filled = 0;
        while filled < buffer.len() {
            match buf.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => { done = true; return Some(Err(e)) },
            }
        }
        match filled {
            0 => { done = true; None },
            4 => Some(Ok(f32::from_le_bytes(buffer))),
            n => {
                done = true;
                Some(Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("file ends with a partial value ({n} stray bytes)"),
                )))
            }
        }
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn raw_io_roundtrip() -> std::io::Result<()> {
        use tempfile::tempdir;

        // Harmless temporary location for output file, in a directory which
        // does not exist yet
        let dir = tempdir()?;
        let file_path = dir.path().join("out").join("test.bin");

        let original_data = vec![1.23, -4.56, 7.89e10];
        write(original_data.iter().copied(), &file_path)?;

        let reloaded_data: Vec<_> = read(&file_path)?
            .collect::<Result<_, _>>()?;

        assert_eq!(original_data, reloaded_data);
        Ok(())
    }

    #[test]
    fn truncated_file_is_an_error() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join("truncated.bin");
        std::fs::write(&file_path, [0_u8, 0, 128, 63, 1, 2])?;

        let reloaded: Vec<_> = read(&file_path)?.collect();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(*reloaded[0].as_ref().unwrap(), 1.0);
        assert!(reloaded[1].is_err());
        Ok(())
    }
}
