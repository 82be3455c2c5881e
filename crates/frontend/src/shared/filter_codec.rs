//! URL query string and cookie encoding of the dashboard view state.
//!
//! Query keys: `executionId`, `filters`, `search`, `sortColumn`, `direction`,
//! `page`, `rows`. The `filters` value is a `,`-separated token list:
//!
//! ```text
//! resource:<name>
//! column:<column>=<v1>|<v2>
//! search:<text>
//! tag:<key>=<value>
//! ```
//!
//! Every atomic part is percent-encoded, so the delimiters `, : = |` only ever
//! appear as delimiters; `serde_qs` then encodes the whole value once more for
//! the address bar. Decoding never fails: bad values fall back to the
//! defaults of [`TableViewState`] and bad tokens are dropped.

use std::borrow::Cow;

use contracts::dashboards::d410_resource_waste::filter::{
    COLUMN_FILTER_PREFIX, RESOURCE_FILTER_PREFIX, SEARCH_FILTER_PREFIX, TAG_FILTER_PREFIX,
};
use contracts::dashboards::d410_resource_waste::table_state::DEFAULT_ROWS_PER_PAGE;
use contracts::dashboards::d410_resource_waste::{Filter, FilterKind, SortDirection, TableViewState};
use serde::{Deserialize, Serialize};

const QS_MAX_DEPTH: usize = 5;
const TOKEN_SEPARATOR: char = ',';
const VALUE_SEPARATOR: char = '|';

/// Everything the address bar carries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewQuery {
    pub execution_id: Option<String>,
    pub filters: Vec<Filter>,
    pub table: TableViewState,
}

impl ViewQuery {
    /// Canonical form: filters ordered by id
    pub fn normalized(&self) -> Self {
        let mut next = self.clone();
        next.filters.sort_by(|a, b| a.id.cmp(&b.id));
        next
    }
}

/// Raw address-bar fields; typed parsing happens after, per field, so one bad
/// value never costs the others.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawQuery {
    #[serde(rename = "executionId", skip_serializing_if = "Option::is_none")]
    execution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<String>,
    #[serde(rename = "sortColumn", skip_serializing_if = "Option::is_none")]
    sort_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn encode(query: &ViewQuery) -> String {
    let table = &query.table;
    let raw = RawQuery {
        execution_id: query.execution_id.as_deref().and_then(non_empty),
        filters: non_empty(&encode_filter_list(&query.filters)),
        search: non_empty(&table.search_text),
        sort_column: non_empty(&table.sort_column),
        direction: (table.sort_direction != SortDirection::default())
            .then(|| table.sort_direction.as_str().to_string()),
        page: (table.page != 0).then(|| table.page.to_string()),
        rows: (table.rows_per_page != DEFAULT_ROWS_PER_PAGE).then(|| table.rows_per_page.to_string()),
    };

    serde_qs::to_string(&raw).unwrap_or_else(|e| {
        log::debug!("filter_codec: cannot encode query: {}", e);
        String::new()
    })
}

pub fn decode(query: &str) -> ViewQuery {
    let query = query.trim_start_matches('?');
    // Lenient mode: invalid UTF-8 escapes degrade to U+FFFD instead of failing
    let raw: RawQuery = match serde_qs::Config::new(QS_MAX_DEPTH, false).deserialize_str(query) {
        Ok(raw) => raw,
        Err(e) => {
            log::debug!("filter_codec: unreadable query `{}`: {}", query, e);
            return ViewQuery::default();
        }
    };

    let mut out = ViewQuery {
        execution_id: raw.execution_id.filter(|v| !v.is_empty()),
        filters: raw.filters.as_deref().map(decode_filter_list).unwrap_or_default(),
        ..ViewQuery::default()
    };

    let table = &mut out.table;
    table.search_text = raw.search.unwrap_or_default();
    table.sort_column = raw.sort_column.unwrap_or_default();
    table.sort_direction = raw
        .direction
        .as_deref()
        .and_then(|v| SortDirection::parse(v.trim()))
        .unwrap_or_default();
    table.page = raw
        .page
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);
    table.rows_per_page = raw
        .rows
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .filter(|rows| TableViewState::is_valid_rows_per_page(*rows))
        .unwrap_or(DEFAULT_ROWS_PER_PAGE);

    out
}

/// Single cookie-safe string for a filter list
pub fn encode_cookie(filters: &[Filter]) -> String {
    urlencoding::encode(&encode_filter_list(filters)).into_owned()
}

pub fn decode_cookie(raw: &str) -> Vec<Filter> {
    match urlencoding::decode(raw.trim()) {
        Ok(list) => decode_filter_list(&list),
        Err(e) => {
            log::debug!("filter_codec: unreadable filter cookie: {}", e);
            Vec::new()
        }
    }
}

/// Filters in canonical (id) order, joined into the `filters` value
pub fn encode_filter_list(filters: &[Filter]) -> String {
    let mut sorted: Vec<&Filter> = filters.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    sorted
        .into_iter()
        .filter_map(encode_filter_token)
        .collect::<Vec<_>>()
        .join(&TOKEN_SEPARATOR.to_string())
}

/// Parses a `filters` value; the last occurrence of an id wins, at the
/// position of the first one.
pub fn decode_filter_list(raw: &str) -> Vec<Filter> {
    let mut out: Vec<Filter> = Vec::new();
    for token in raw.split(TOKEN_SEPARATOR).filter(|t| !t.is_empty()) {
        match decode_filter_token(token) {
            Some(filter) => match out.iter_mut().find(|f| f.id == filter.id) {
                Some(existing) => *existing = filter,
                None => out.push(filter),
            },
            None => log::debug!("filter_codec: dropping malformed filter token `{}`", token),
        }
    }
    out
}

fn encode_filter_token(filter: &Filter) -> Option<String> {
    match filter.kind {
        FilterKind::Resource => {
            let name = filter.resource_name()?;
            Some(format!("resource:{}", encode_component(name)))
        }
        FilterKind::Column => {
            let column = filter.column.as_deref()?;
            let values = filter
                .values
                .iter()
                .map(|v| encode_component(v))
                .collect::<Vec<_>>()
                .join(&VALUE_SEPARATOR.to_string());
            Some(format!("column:{}={}", encode_component(column), values))
        }
        FilterKind::Search => {
            let text = filter.id.strip_prefix(SEARCH_FILTER_PREFIX)?;
            Some(format!("search:{}", encode_component(text)))
        }
        FilterKind::Tag => {
            let key = filter.column.as_deref()?;
            let value = filter.values.first()?;
            Some(format!("tag:{}={}", encode_component(key), encode_component(value)))
        }
    }
}

fn decode_filter_token(token: &str) -> Option<Filter> {
    let (kind, rest) = token.split_once(':')?;
    match format!("{}:", kind).as_str() {
        RESOURCE_FILTER_PREFIX => {
            let name = decode_component(rest).filter(|n| !n.is_empty())?;
            Some(Filter::resource(&name))
        }
        COLUMN_FILTER_PREFIX => {
            let (column, values) = rest.split_once('=')?;
            let column = decode_component(column).filter(|c| !c.is_empty())?;
            let values = if values.is_empty() {
                Vec::new()
            } else {
                values
                    .split(VALUE_SEPARATOR)
                    .map(decode_component)
                    .collect::<Option<Vec<_>>>()?
            };
            Some(Filter::column(&column, values))
        }
        SEARCH_FILTER_PREFIX => {
            let text = decode_component(rest).filter(|t| !t.is_empty())?;
            Some(Filter::search(&text))
        }
        TAG_FILTER_PREFIX => {
            let (key, value) = rest.split_once('=')?;
            let key = decode_component(key).filter(|k| !k.is_empty())?;
            let value = decode_component(value)?;
            Some(Filter::tag(&key, &value))
        }
        _ => None,
    }
}

fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_filters() -> Vec<Filter> {
        vec![
            Filter::resource("ec2_instances"),
            Filter::column("Status", vec!["Stopped".into(), "Error".into()]),
            Filter::search("vol,1|a:b=c&d e+f"),
            Filter::tag("team", "data platform"),
        ]
    }

    #[test]
    fn test_round_trip_is_normalized() {
        let query = ViewQuery {
            execution_id: Some("general_1617617627".into()),
            filters: sample_filters(),
            table: TableViewState {
                page: 2,
                rows_per_page: 50,
                sort_column: "PricePerMonth".into(),
                sort_direction: SortDirection::Asc,
                search_text: "i-0a b".into(),
            },
        };
        assert_eq!(decode(&encode(&query)), query.normalized());
    }

    #[test]
    fn test_decode_encode_is_idempotent() {
        let raw = "?filters=resource:ebs,column:Data.Region=us-east-1|eu-west-1&page=4&utm=x&rows=100";
        let once = encode(&decode(raw));
        let twice = encode(&decode(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_defaults_are_omitted() {
        assert_eq!(encode(&ViewQuery::default()), "");
        let query = ViewQuery {
            filters: vec![Filter::resource("rds")],
            ..ViewQuery::default()
        };
        assert_eq!(encode(&query), "filters=resource%3Ards");
    }

    #[test]
    fn test_filters_written_in_id_order() {
        let query = ViewQuery {
            filters: vec![Filter::search("x"), Filter::resource("ebs")],
            ..ViewQuery::default()
        };
        assert_eq!(encode(&query), "filters=resource%3Aebs%2Csearch%3Ax");
    }

    #[test]
    fn test_malformed_values_fail_soft() {
        let q = decode("page=abc&rows=7&direction=sideways&sortColumn=ID");
        assert_eq!(q.table.page, 0);
        assert_eq!(q.table.rows_per_page, 20);
        assert_eq!(q.table.sort_direction, SortDirection::Desc);
        assert_eq!(q.table.sort_column, "ID");

        let q = decode("page=-1&filters=bogus:1,resource:,column:nocolumnvalue,resource:ok");
        assert_eq!(q.table.page, 0);
        assert_eq!(q.filters, vec![Filter::resource("ok")]);

        let q = decode("search=%E0%A4%A&page=%ZZ&rows=50");
        assert!(q.table.search_text.starts_with('\u{FFFD}'));
        assert_eq!(q.table.page, 0);
        assert_eq!(q.table.rows_per_page, 50);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let q = decode("executionId=exec_9&theme=dark&fbclid=abc");
        assert_eq!(q.execution_id.as_deref(), Some("exec_9"));
        assert!(q.filters.is_empty());
        assert_eq!(q.table, TableViewState::default());
    }

    #[test]
    fn test_plus_decodes_to_space() {
        assert_eq!(decode("search=hello+world").table.search_text, "hello world");
        assert_eq!(decode("search=a%2Bb").table.search_text, "a+b");
    }

    #[test]
    fn test_percent_encoded_filter_list() {
        let q = decode("filters=resource%3Aebs_volumes");
        assert_eq!(q.filters, vec![Filter::resource("ebs_volumes")]);
    }

    #[test]
    fn test_hand_written_query_with_raw_delimiters() {
        let q = decode("?filters=resource:ebs,column:Data.Region=us-east-1|eu-west-1&direction=asc");
        assert_eq!(
            q.filters,
            vec![
                Filter::resource("ebs"),
                Filter::column("Region", vec!["us-east-1".into(), "eu-west-1".into()]),
            ]
        );
        assert_eq!(q.table.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_repeated_key_falls_back_to_defaults() {
        assert_eq!(decode("page=2&page=3"), ViewQuery::default());
    }

    #[test]
    fn test_duplicate_ids_keep_last_value() {
        let q = decode("filters=column:Data.Status=Stopped,resource:a,column:Data.Status=Error");
        assert_eq!(
            q.filters,
            vec![Filter::column("Status", vec!["Error".into()]), Filter::resource("a")]
        );
    }

    #[test]
    fn test_cookie_round_trip() {
        let filters = sample_filters();
        let cookie = encode_cookie(&filters);
        assert!(!cookie.contains(&[';', ',', ' ', '"'][..]));

        let mut expected = filters.clone();
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(decode_cookie(&cookie), expected);
        assert!(decode_cookie("%E0%A4%A").is_empty());
    }
}
