//! Archive extraction.
//!
//! [`DefaultArchiveExtractor`] unpacks `.tar.gz`/`.tgz` and `.zip` archives.
//! Read failures are classified so the installer can tell a truncated
//! download (which it purges) from an archive that is simply wrong.

use crate::error::ExtractError;
use crate::tools::ArchiveFormat;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// Unpacks an archive into a directory.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `destination`, creating it if needed.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ExtractError>;
}

/// Extracts tar.gz and zip archives, choosing the format from the file name.
///
/// Entries whose paths would escape `destination` are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultArchiveExtractor;

impl DefaultArchiveExtractor {
    /// Create an extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for DefaultArchiveExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ExtractError> {
        let format = ArchiveFormat::from_path(archive).ok_or_else(|| ExtractError::Unsupported {
            archive: archive.to_path_buf(),
        })?;

        fs::create_dir_all(destination).map_err(|source| ExtractError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

        log::debug!(
            "Extracting {} ({format}) into {}",
            archive.display(),
            destination.display()
        );
        match format {
            ArchiveFormat::TarGz => extract_targz(archive, destination),
            ArchiveFormat::Zip => extract_zip(archive, destination),
        }
    }
}

fn open(archive: &Path) -> Result<File, ExtractError> {
    File::open(archive).map_err(|source| ExtractError::Io {
        path: archive.to_path_buf(),
        source,
    })
}

/// Map an IO error raised while reading `archive` or writing into
/// `destination`.
fn classify(archive: &Path, destination: &Path, err: io::Error) -> ExtractError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => ExtractError::Corrupted {
            archive: archive.to_path_buf(),
            source: err,
        },
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::Other => {
            ExtractError::Format {
                archive: archive.to_path_buf(),
                message: err.to_string(),
            }
        }
        _ => ExtractError::Io {
            path: destination.to_path_buf(),
            source: err,
        },
    }
}

fn extract_targz(archive: &Path, destination: &Path) -> Result<(), ExtractError> {
    let decoder = GzDecoder::new(BufReader::new(open(archive)?));
    let mut tar = tar::Archive::new(decoder);
    let fail = |e| classify(archive, destination, e);

    for entry in tar.entries().map_err(fail)? {
        let mut entry = entry.map_err(fail)?;
        if !entry.unpack_in(destination).map_err(fail)? {
            let name = entry.path().map(|p| p.display().to_string()).unwrap_or_default();
            log::warn!("Skipped archive entry outside the install directory: {name}");
        }
    }

    // Read the tar padding and gzip trailer so truncation there and CRC
    // mismatches are reported too.
    io::copy(&mut tar.into_inner(), &mut io::sink()).map_err(fail)?;
    Ok(())
}

fn extract_zip(archive: &Path, destination: &Path) -> Result<(), ExtractError> {
    let mut zip = zip::ZipArchive::new(BufReader::new(open(archive)?))
        .map_err(|e| zip_error(archive, destination, e))?;

    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| zip_error(archive, destination, e))?;
        let Some(relative) = file.enclosed_name() else {
            log::warn!(
                "Skipped archive entry outside the install directory: {}",
                file.name()
            );
            continue;
        };
        let out_path = destination.join(relative);
        let io_err = |source| ExtractError::Io {
            path: out_path.clone(),
            source,
        };

        if file.is_dir() {
            fs::create_dir_all(&out_path).map_err(io_err)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut out = File::create(&out_path).map_err(io_err)?;
        io::copy(&mut file, &mut out).map_err(|e| classify(archive, &out_path, e))?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(io_err)?;
        }
    }
    Ok(())
}

fn zip_error(archive: &Path, destination: &Path, err: zip::result::ZipError) -> ExtractError {
    match err {
        zip::result::ZipError::Io(e) => classify(archive, destination, e),
        other => ExtractError::Format {
            archive: archive.to_path_buf(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Bytes that deflate poorly, so truncating the compressed stream cuts
    /// into file content rather than trailing padding.
    fn noise(len: usize) -> Vec<u8> {
        let mut state = 0x2545_f491_u32;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    fn targz(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        {
            let mut builder = tar::Builder::new(&mut encoder);
            for (path, data, mode) in entries {
                let mut header = tar::Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(*mode);
                header.set_cksum();
                builder.append_data(&mut header, path, *data).unwrap();
            }
            builder.finish().unwrap();
        }
        encoder.finish().unwrap()
    }

    fn write_archive(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_extract_targz() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(
            &dir,
            "volta-v1.0.0.tar.gz",
            &targz(&[
                ("dist/bin/volta", b"#!/bin/sh\necho 1.0.0\n", 0o755),
                ("README.md", b"hello", 0o644),
            ]),
        );
        let dest = dir.path().join("install/volta");

        DefaultArchiveExtractor::new().extract(&archive, &dest).unwrap();

        assert_eq!(fs::read(dest.join("README.md")).unwrap(), b"hello");
        let binary = dest.join("dist/bin/volta");
        assert!(binary.is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&binary).unwrap().permissions().mode();
            assert_ne!(mode & 0o111, 0, "binary should stay executable");
        }
    }

    #[test]
    fn test_truncated_targz_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let content = noise(64 * 1024);
        let full = targz(&[("dist/bin/volta", content.as_slice(), 0o755)]);
        let archive = write_archive(&dir, "volta-v1.0.0.tar.gz", &full[..full.len() / 2]);

        let err = DefaultArchiveExtractor::new()
            .extract(&archive, &dir.path().join("out"))
            .unwrap_err();

        assert!(matches!(err, ExtractError::Corrupted { .. }), "got {err:?}");
    }

    #[test]
    fn test_header_only_targz_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let full = targz(&[("a", b"abc", 0o644)]);
        let archive = write_archive(&dir, "a.tar.gz", &full[..10]);

        let err = DefaultArchiveExtractor::new()
            .extract(&archive, &dir.path().join("out"))
            .unwrap_err();

        assert!(matches!(err, ExtractError::Corrupted { .. }), "got {err:?}");
    }

    #[test]
    fn test_truncated_gzip_trailer_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let full = targz(&[("dist/bin/volta", b"#!/bin/sh\necho 1.0.0\n", 0o755)]);
        for cut in 1..=8 {
            let archive = write_archive(&dir, "volta-v1.0.0.tar.gz", &full[..full.len() - cut]);
            let dest = dir.path().join(format!("out-{cut}"));

            let err = DefaultArchiveExtractor::new().extract(&archive, &dest).unwrap_err();

            assert!(matches!(err, ExtractError::Corrupted { .. }), "cut {cut}: got {err:?}");
        }
    }

    #[test]
    fn test_gzip_crc_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut bytes = targz(&[("dist/bin/volta", b"#!/bin/sh\necho 1.0.0\n", 0o755)]);
        let crc_start = bytes.len() - 8;
        bytes[crc_start] ^= 0xff;
        let archive = write_archive(&dir, "volta-v1.0.0.tar.gz", &bytes);

        let err = DefaultArchiveExtractor::new()
            .extract(&archive, &dir.path().join("out"))
            .unwrap_err();

        assert!(!matches!(err, ExtractError::Corrupted { .. }), "got {err:?}");
    }

    #[test]
    fn test_garbage_targz_is_format_error() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(&dir, "volta.tar.gz", b"this is not a gzip stream at all");

        let err = DefaultArchiveExtractor::new()
            .extract(&archive, &dir.path().join("out"))
            .unwrap_err();

        assert!(!matches!(err, ExtractError::Corrupted { .. }), "got {err:?}");
    }

    #[test]
    fn test_extract_zip_with_mode() {
        let dir = TempDir::new().unwrap();
        let mut buffer = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
            zip.add_directory("dist/", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.start_file("dist/volta.exe", options).unwrap();
            zip.write_all(b"MZ").unwrap();
            zip.finish().unwrap();
        }
        let archive = write_archive(&dir, "volta.zip", &buffer);
        let dest = dir.path().join("out");

        DefaultArchiveExtractor::new().extract(&archive, &dest).unwrap();

        assert_eq!(fs::read(dest.join("dist/volta.exe")).unwrap(), b"MZ");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.join("dist/volta.exe")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_garbage_zip_is_format_error() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(&dir, "volta.zip", b"PK but not really");

        let err = DefaultArchiveExtractor::new()
            .extract(&archive, &dir.path().join("out"))
            .unwrap_err();

        assert!(matches!(err, ExtractError::Format { .. }), "got {err:?}");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(&dir, "volta.tar.xz", b"");

        let err = DefaultArchiveExtractor::new()
            .extract(&archive, &dir.path().join("out"))
            .unwrap_err();

        assert!(matches!(err, ExtractError::Unsupported { .. }));
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = DefaultArchiveExtractor::new()
            .extract(&dir.path().join("absent.tar.gz"), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[test]
    fn test_classify() {
        let archive = Path::new("a.tar.gz");
        let dest = Path::new("out");
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(classify(archive, dest, eof), ExtractError::Corrupted { .. }));
        let bad = io::Error::new(io::ErrorKind::InvalidInput, "corrupt deflate stream");
        assert!(matches!(classify(archive, dest, bad), ExtractError::Format { .. }));
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(classify(archive, dest, denied), ExtractError::Io { .. }));
    }
}
