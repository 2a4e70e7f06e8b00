/// Get the substring between the first `str1` and the first `str2` after it
pub fn str_between_str<'a>(full_str: &'a str, str1: &str, str2: &str) -> Option<&'a str> {
    let x = full_str.find(str1)? + str1.len();

    let y = x + full_str[x..].find(str2)?;

    let result = &full_str[x..y];

    Some(result)
}

/// Fills the `{route_id}` placeholder of a URL template
pub fn fill_route_template(template: &str, route_id: &str) -> String {
    template.replace("{route_id}", route_id)
}

/// Fills the `{stop_id}` placeholder of a URL template
pub fn fill_stop_template(template: &str, stop_id: &str) -> String {
    template.replace("{stop_id}", stop_id)
}

#[cfg(test)]
mod tests {
    use super::{fill_route_template, fill_stop_template, str_between_str};

    #[test]
    fn test_str_between_str() {
        assert_eq!(str_between_str("go('282')", "go('", "')"), Some("282"));
        assert_eq!(str_between_str("')go('282')", "go('", "')"), Some("282"));
        assert_eq!(str_between_str("go('282", "go('", "')"), None);
        assert_eq!(str_between_str("282')", "go('", "')"), None);
    }

    #[test]
    fn test_fill_route_template() {
        assert_eq!(
            fill_route_template("https://example.org/route.jsp?rid={route_id}", "10417"),
            "https://example.org/route.jsp?rid=10417"
        );
    }

    #[test]
    fn test_fill_stop_template() {
        assert_eq!(
            fill_stop_template(crate::fetcher::DEFAULT_STOP_URL_TEMPLATE, "10785"),
            "https://pda5284.gov.taipei/MQS/stop.jsp?from=r&sid=10785"
        );
    }
}
