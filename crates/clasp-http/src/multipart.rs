//! The multipart strategy: an in-crate `multipart/form-data` parser.
//!
//! Parts are delimited by `--<boundary>` lines; each part carries headers,
//! a blank line, then its content up to the next delimiter. Text parts
//! become key-space values under their Content-Disposition name; file
//! parts become `FileHandle`s. File bytes buffer in memory until the
//! process-wide ceiling is spent, then spill to temp-file storage, so one
//! oversized upload cannot pin the whole request in memory.

use std::io::Write;

use clasp_core::{bind_key_space, validate, Bindable, Error, ErrorKind, Errors, FileHandle, KeySpace};
use tempfile::NamedTempFile;

use crate::bind::max_memory;
use crate::request::Request;

/// Bind a multipart request: parse the body into a key space, then map
/// and validate. A parse failure short-circuits with the record untouched.
pub fn bind_multipart<T: Bindable>(target: &mut T, req: &Request) -> Errors {
    let mut space = KeySpace::new();
    if let Err(err) = parse_multipart(req.content_type(), req.body(), max_memory(), &mut space) {
        return Errors::one(err);
    }
    let mut errors = bind_key_space(target, &space);
    errors.extend(validate(target));
    errors
}

/// Parse a multipart body into the key space. `budget` is the number of
/// file bytes allowed to stay in memory for this request; file parts past
/// it spill to temp storage.
pub(crate) fn parse_multipart(
    content_type: &str,
    body: &[u8],
    budget: usize,
    space: &mut KeySpace,
) -> Result<(), Error> {
    let boundary = boundary_param(content_type).ok_or_else(|| {
        Error::global(
            ErrorKind::Deserialization,
            "no multipart boundary param in Content-Type",
        )
    })?;
    let delimiter = format!("--{boundary}").into_bytes();
    let closing = [b"\r\n" as &[u8], &delimiter].concat();
    let mut remaining = budget;

    let mut pos = match find(body, &delimiter, 0) {
        Some(start) => start + delimiter.len(),
        None => return Err(malformed("no opening boundary in body")),
    };
    loop {
        let rest = &body[pos.min(body.len())..];
        if rest.starts_with(b"--") {
            return Ok(());
        }
        if !rest.starts_with(b"\r\n") {
            return Err(malformed("boundary not followed by CRLF"));
        }
        pos += 2;

        let headers_end = match find(body, b"\r\n\r\n", pos) {
            Some(end) => end,
            None => return Err(malformed("part headers not terminated")),
        };
        let headers = std::str::from_utf8(&body[pos..headers_end])
            .map_err(|_| malformed("part headers are not UTF-8"))?;
        let part = disposition(headers)?;

        let content_start = headers_end + 4;
        let content_end = match find(body, &closing, content_start) {
            Some(end) => end,
            None => return Err(malformed("part content not terminated by boundary")),
        };
        let content = &body[content_start..content_end];
        pos = content_end + closing.len();

        let (name, filename) = match part {
            Some(part) => part,
            // A part with no Content-Disposition name cannot be addressed.
            None => continue,
        };
        match filename {
            Some(filename) => {
                let handle = if content.len() <= remaining {
                    remaining -= content.len();
                    FileHandle::in_memory(filename, content)
                } else {
                    spill(&filename, content)?
                };
                space.add_file(name, handle);
            }
            None => {
                let text = std::str::from_utf8(content)
                    .map_err(|_| malformed("part value is not UTF-8"))?;
                space.add_value(name, text);
            }
        }
    }
}

/// Extract the `boundary` parameter from a multipart Content-Type.
pub(crate) fn boundary_param(content_type: &str) -> Option<String> {
    for param in content_type.split(';') {
        let param = param.trim();
        if let Some(value) = param.strip_prefix("boundary=") {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }
    None
}

/// The part's Content-Disposition name and optional filename; `None` when
/// the part carries no usable disposition.
fn disposition(headers: &str) -> Result<Option<(String, Option<String>)>, Error> {
    for line in headers.split("\r\n") {
        let (header, value) = match line.split_once(':') {
            Some(split) => split,
            None => continue,
        };
        if !header.eq_ignore_ascii_case("content-disposition") {
            continue;
        }
        let mut name = None;
        let mut filename = None;
        for param in value.split(';') {
            let param = param.trim();
            if let Some(v) = param.strip_prefix("name=") {
                name = Some(unquote(v));
            } else if let Some(v) = param.strip_prefix("filename=") {
                filename = Some(unquote(v));
            }
        }
        return Ok(name.map(|name| (name, filename)));
    }
    Ok(None)
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').to_owned()
}

fn spill(filename: &str, content: &[u8]) -> Result<FileHandle, Error> {
    let write = || -> std::io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content)?;
        file.flush()?;
        Ok(file)
    };
    match write() {
        Ok(file) => Ok(FileHandle::spilled(filename, content.len() as u64, file)),
        Err(err) => Err(Error::global(
            ErrorKind::Deserialization,
            format!("multipart spill failed: {err}"),
        )),
    }
}

fn malformed(detail: &str) -> Error {
    Error::global(
        ErrorKind::Deserialization,
        format!("malformed multipart body: {detail}"),
    )
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| offset + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, filename, content) in parts {
            out.extend_from_slice(b"--BOUNDARY\r\n");
            match filename {
                Some(filename) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            out.extend_from_slice(content);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"--BOUNDARY--\r\n");
        out
    }

    const CT: &str = "multipart/form-data; boundary=BOUNDARY";

    #[test]
    fn boundary_extraction() {
        assert_eq!(boundary_param(CT).as_deref(), Some("BOUNDARY"));
        assert_eq!(
            boundary_param("multipart/form-data; boundary=\"quoted\"").as_deref(),
            Some("quoted")
        );
        assert_eq!(boundary_param("multipart/form-data"), None);
    }

    #[test]
    fn text_parts_become_values() {
        let body = body(&[
            ("title", None, b"Glorious Post Title"),
            ("rating", None, b"4"),
            ("rating", None, b"5"),
        ]);
        let mut space = KeySpace::new();
        parse_multipart(CT, &body, usize::MAX, &mut space).unwrap();
        assert_eq!(space.values("title").unwrap(), ["Glorious Post Title"]);
        assert_eq!(space.values("rating").unwrap(), ["4", "5"]);
    }

    #[test]
    fn file_parts_become_handles() {
        let body = body(&[("picture", Some("cat.jpg"), b"\xFF\xD8 not really a jpeg")]);
        let mut space = KeySpace::new();
        parse_multipart(CT, &body, usize::MAX, &mut space).unwrap();
        let files = space.files("picture").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "cat.jpg");
        assert_eq!(files[0].bytes().unwrap(), b"\xFF\xD8 not really a jpeg");
        assert!(!files[0].is_spilled());
    }

    #[test]
    fn files_past_the_budget_spill() {
        let body = body(&[
            ("a", Some("a.bin"), b"12345678"),
            ("b", Some("b.bin"), b"12345678"),
        ]);
        let mut space = KeySpace::new();
        parse_multipart(CT, &body, 10, &mut space).unwrap();
        let a = &space.files("a").unwrap()[0];
        let b = &space.files("b").unwrap()[0];
        assert!(!a.is_spilled());
        assert!(b.is_spilled());
        assert_eq!(b.bytes().unwrap(), b"12345678");
    }

    #[test]
    fn missing_boundary_param() {
        let mut space = KeySpace::new();
        let err = parse_multipart("multipart/form-data", b"", 0, &mut space).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialization);
        assert_eq!(err.message, "no multipart boundary param in Content-Type");
    }

    #[test]
    fn truncated_body_is_malformed() {
        let mut space = KeySpace::new();
        let err = parse_multipart(CT, b"--BOUNDARY\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\nvalue", 0, &mut space)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialization);

        let err = parse_multipart(CT, b"no boundary here", 0, &mut space).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialization);
    }

    #[test]
    fn binary_content_with_crlf_survives() {
        let payload = b"line one\r\nline two\r\n--not-the-boundary\r\nline three";
        let body = body(&[("blob", Some("blob.bin"), payload)]);
        let mut space = KeySpace::new();
        parse_multipart(CT, &body, usize::MAX, &mut space).unwrap();
        assert_eq!(space.files("blob").unwrap()[0].bytes().unwrap(), payload);
    }
}
