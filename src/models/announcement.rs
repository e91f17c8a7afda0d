use url::Url;

/// Render the chat message for a question.
///
/// `base_url` must end with a slash; `Config` normalises it on load.
pub fn format_text(base_url: &Url, id: u32, title: &str, slug: &str, difficulty: &str) -> String {
    let link = format!("{}problems/{}/", base_url, slug);
    format!("{}. {} - {}\n{}", id, title, difficulty, link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_title_line_and_problem_link() {
        let base = Url::parse("https://leetcode.com/").unwrap();
        assert_eq!(
            format_text(&base, 42, "Two Sum", "two-sum", "Easy"),
            "42. Two Sum - Easy\nhttps://leetcode.com/problems/two-sum/"
        );
    }

    #[test]
    fn honours_a_mirror_base_url() {
        let base = Url::parse("http://127.0.0.1:8080/lc/").unwrap();
        assert_eq!(
            format_text(&base, 7, "Reverse Integer", "reverse-integer", "Medium"),
            "7. Reverse Integer - Medium\nhttp://127.0.0.1:8080/lc/problems/reverse-integer/"
        );
    }
}
