// Cache keys for the logical queries.

pub fn repository(owner: &str, repo: &str) -> String {
    format!("repo:{}/{}", owner, repo)
}

pub fn contributors(owner: &str, repo: &str) -> String {
    format!("contributors:{}/{}", owner, repo)
}

pub fn contributors_with_details(owner: &str, repo: &str) -> String {
    format!("contributors_with_details:{}/{}", owner, repo)
}

pub fn user(username: &str) -> String {
    format!("user:{}", username)
}

pub const RATE_LIMIT: &str = "rate_limit";
