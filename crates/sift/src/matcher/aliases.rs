//! Wildcard matching of identifier names and string contents.

use super::SearchSettings;
use crate::match_context::{MatchContext, TextAlias};
use crate::wildcard::{WildcardKind, WildcardMeta, has_wildcard, identifier_wildcards, strip_aliases};

/// Matches `file_value` against a wildcard-bearing `query_value`.
///
/// `wildcards` lists the wildcards of `query_value` in order. Aliased
/// wildcards already bound in `context` must capture the same text
/// (case-insensitively when requested); unbound ones are bound.
pub fn match_string_or_identifier_aliases(
    query_value: &str,
    file_value: &str,
    wildcards: &[WildcardMeta],
    context: &mut MatchContext<'_>,
    settings: &SearchSettings<'_>,
) -> bool {
    let pattern = strip_aliases(query_value);
    let regex = match settings.patterns.get(&pattern, settings.case_insensitive) {
        Ok(regex) => regex,
        Err(error) => {
            tracing::warn!(target: "sift::matcher", %error, pattern = %pattern, "wildcard pattern rejected");
            return false;
        }
    };
    let Some(captures) = regex.captures(file_value) else {
        return false;
    };

    for (index, wildcard) in wildcards.iter().enumerate() {
        let Some(alias) = wildcard.alias.as_deref() else {
            continue;
        };
        let captured = captures
            .get(index + 1)
            .map_or("", |capture| capture.as_str());

        if let Some(bound) = context.text_alias(alias) {
            let agrees = if settings.case_insensitive {
                bound.value.to_lowercase() == captured.to_lowercase()
            } else {
                bound.value == captured
            };
            if !agrees {
                settings
                    .logger
                    .log(format_args!("alias {alias}: '{}' != '{captured}'", bound.value));
                return false;
            }
            continue;
        }

        let value = TextAlias {
            wildcard: wildcard.clone(),
            value: captured.to_owned(),
        };
        match wildcard.kind {
            WildcardKind::String => context.add_string_alias(alias, value),
            WildcardKind::Identifier | WildcardKind::NodesTree => {
                context.add_identifier_alias(alias, value);
            }
        }
    }
    true
}

/// Compares two identifier names, honouring wildcards in `query_name`.
pub fn match_identifier_text(
    query_name: &str,
    file_name: &str,
    context: &mut MatchContext<'_>,
    settings: &SearchSettings<'_>,
) -> bool {
    if has_wildcard(query_name) {
        let wildcards = identifier_wildcards(query_name);
        return match_string_or_identifier_aliases(query_name, file_name, &wildcards, context, settings);
    }
    if settings.case_insensitive {
        query_name.to_lowercase() == file_name.to_lowercase()
    } else {
        query_name == file_name
    }
}
