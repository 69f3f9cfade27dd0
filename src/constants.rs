pub(crate) const DEFAULT_BUFFER_LIMIT: usize = 2048;
pub(crate) const DEFAULT_MARGIN: usize = 128;
pub(crate) const DEFAULT_HEAD_LIMIT: usize = 8 * 1024;

pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const CRLF: &str = "\r\n";
pub(crate) const CRLF_CRLF: &str = "\r\n\r\n";
pub(crate) const HEADER_SEP: &str = ": ";

pub(crate) const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub(crate) const FILE_NAME_ATTR: &str = "filename";
pub(crate) const PART_ID_SUFFIX: &str = ".out";

pub(crate) const INDEX_HTML: &str = r#"
<html>
    <head><title>partstream file upload</title></head>
    <body>
        <form action="/" enctype="multipart/form-data" method="post">
            <input type="file" name="files" multiple>
            <input type="submit"/>
        </form>
    </body>
</html>
"#;

pub(crate) fn boundary_start(boundary: &str) -> Vec<u8> {
    format!("{}{}{}", BOUNDARY_EXT, boundary, CRLF).into_bytes()
}

pub(crate) fn boundary_end(boundary: &str) -> Vec<u8> {
    format!("{}{}{}{}", BOUNDARY_EXT, boundary, BOUNDARY_EXT, CRLF).into_bytes()
}
