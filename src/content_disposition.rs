use crate::constants;

/// Finds the `filename` attribute among a part's header lines.
///
/// The value is the first double-quoted string following the `filename`
/// attribute on the first line that has one. Only a whole attribute name
/// counts, so `name="filename_field"` is skipped. Empty values count as
/// missing.
pub(crate) fn file_name<'a, I>(lines: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let (line, value_from) = lines
        .into_iter()
        .find_map(|line| attr_value_start(line).map(|idx| (line, idx)))?;
    let rest = &line[value_from..];

    let value_start = rest.find('"')? + 1;
    let value_len = rest[value_start..].find('"')?;

    Some(&rest[value_start..value_start + value_len]).filter(|name| !name.is_empty())
}

/// Returns the offset just past the `=` of the first `filename` attribute in
/// `line`.
fn attr_value_start(line: &str) -> Option<usize> {
    line.match_indices(constants::FILE_NAME_ATTR).find_map(|(idx, attr)| {
        let starts_token = line[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| c == ';' || c.is_whitespace());
        if !starts_token {
            return None;
        }

        let after = &line[idx + attr.len()..];
        let value = after.trim_start().strip_prefix('=')?;
        Some(line.len() - value.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let val = r#"Content-Disposition: form-data; name="my_field"; filename="file_name.txt""#;
        assert_eq!(file_name(vec![val]), Some("file_name.txt"));

        let val = r#"Content-Disposition: form-data; name="my_field"; filename="file name.txt""#;
        assert_eq!(file_name(vec![val]), Some("file name.txt"));

        let val = r#"Content-Disposition: form-data; filename="file-name.txt""#;
        assert_eq!(file_name(vec![val]), Some("file-name.txt"));

        let val = "Content-Disposition: form-data; filename=\"কখগ-你好.txt\"";
        assert_eq!(file_name(vec![val]), Some("কখগ-你好.txt"));
    }

    #[test]
    fn test_file_name_on_later_line() {
        let lines = vec![
            "Content-Type: text/plain",
            r#"Content-Disposition: form-data; name="files"; filename="a.txt""#,
        ];
        assert_eq!(file_name(lines), Some("a.txt"));
    }

    #[test]
    fn test_file_name_inside_other_attributes() {
        let val = r#"Content-Disposition: form-data; name="filename_field"; filename="a.txt""#;
        assert_eq!(file_name(vec![val]), Some("a.txt"));

        let val = r#"Content-Disposition: form-data; name="myfilename"; filename = "b.txt""#;
        assert_eq!(file_name(vec![val]), Some("b.txt"));

        let lines = vec![
            r#"X-Note: "filename""#,
            r#"Content-Disposition: form-data; name="files"; filename="c.txt""#,
        ];
        assert_eq!(file_name(lines), Some("c.txt"));
    }

    #[test]
    fn test_missing_file_name() {
        assert_eq!(file_name(vec![r#"Content-Disposition: form-data; name="text""#]), None);
        assert_eq!(file_name(vec![r#"Content-Disposition: form-data; filename="""#]), None);
        assert_eq!(file_name(vec!["Content-Disposition: form-data; filename=a.txt"]), None);
        assert_eq!(file_name(vec![r#"Content-Disposition: form-data; name="filename_only""#]), None);
        assert_eq!(file_name(vec![r#"Content-Disposition: form-data; filename="a.txt"#]), None);
        assert_eq!(file_name(Vec::new()), None);
    }
}
