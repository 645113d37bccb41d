//! JSON and XML renderings of a [`VcsInfo`].
//!
//! Both documents are compact and always contain every field, in the same
//! order, even when a value is empty or `false`.

use crate::error::{Error, Result};
use crate::models::VcsInfo;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Renders `info` as a single-line JSON object with snake_case keys.
///
/// # Example
///
/// ```
/// use vcsinfo_core::{to_json, VcsInfo};
///
/// let json = to_json(&VcsInfo::new("git", "/repo"))?;
/// assert!(json.starts_with(r#"{"vcs_name":"git","path":"/repo","#));
/// # Ok::<(), vcsinfo_core::Error>(())
/// ```
pub fn to_json(info: &VcsInfo) -> Result<String> {
    Ok(serde_json::to_string(info)?)
}

/// Renders `info` as an XML document with a `VcsInfo` root element and
/// camelCase child elements. Text is escaped by the writer; there is no XML
/// declaration and no indentation.
///
/// # Example
///
/// ```
/// use vcsinfo_core::{to_xml, VcsInfo};
///
/// let xml = to_xml(&VcsInfo::new("hg", "/repo"))?;
/// assert!(xml.starts_with("<VcsInfo><vcsName>hg</vcsName><path>/repo</path>"));
/// # Ok::<(), vcsinfo_core::Error>(())
/// ```
pub fn to_xml(info: &VcsInfo) -> Result<String> {
    let root = info.repository_root.display().to_string();
    let path = info.path.display().to_string();

    let fields: [(&str, &str); 10] = [
        ("vcsName", info.vcs_name.as_str()),
        ("path", path.as_str()),
        ("repositoryRoot", root.as_str()),
        ("shortHash", info.short_hash.as_str()),
        ("hash", info.hash.as_str()),
        ("revision", info.revision.as_str()),
        ("branch", info.branch.as_str()),
        ("hasStaged", bool_text(info.has_staged)),
        ("hasModified", bool_text(info.has_modified)),
        ("hasNew", bool_text(info.has_new)),
    ];

    let mut document = Element::new("VcsInfo");
    for (name, value) in fields {
        let mut child = Element::new(name);
        if !value.is_empty() {
            child.children.push(XMLNode::Text(value.to_string()));
        }
        document.children.push(XMLNode::Element(child));
    }

    let config = EmitterConfig::new()
        .write_document_declaration(false)
        .perform_indent(false)
        .normalize_empty_elements(false);

    let mut out = Vec::new();
    document
        .write_with_config(&mut out, config)
        .map_err(|e| Error::other(format!("Failed to write XML: {}", e)))?;

    String::from_utf8(out).map_err(|e| Error::other(format!("XML output is not UTF-8: {}", e)))
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
