//! @acp:module "Field Naming"
//! @acp:summary "Resolves a field's output name from its serialize-as tag"
//! @acp:domain serialization
//! @acp:layer logic

/// Name that means "never emit this field".
pub const SKIP_NAME: &str = "-";

const OMIT_EMPTY: &str = "omitempty";

/// @acp:summary "Resolved output name and omit-if-empty flag"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldName<'a> {
    pub name: &'a str,
    pub omit_empty: bool,
}

impl<'a> FieldName<'a> {
    /// @acp:summary "Resolve `<name>[,omitempty]` against the declared identifier"
    ///
    /// A blank name part keeps the identifier. Returns `None` for `"-"`,
    /// which suppresses the field.
    pub fn resolve(ident: &'a str, tag: Option<&'a str>) -> Option<Self> {
        let mut resolved = FieldName {
            name: ident,
            omit_empty: false,
        };

        if let Some(tag) = tag {
            let (name, options) = tag.split_once(',').unwrap_or((tag, ""));
            resolved.omit_empty = options.split(',').any(|opt| opt.trim() == OMIT_EMPTY);
            let name = name.trim();
            if !name.is_empty() {
                resolved.name = name;
            }
        }

        if resolved.name.is_empty() || resolved.name == SKIP_NAME {
            return None;
        }
        Some(resolved)
    }
}
