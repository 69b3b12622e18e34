use seoscan::handlers::*;

#[test]
fn test_parse_sitemap_url_with_scheme() {
    let result = parse_sitemap_url("https://example.com/sitemap.xml");
    assert_eq!(result, Some("https://example.com/sitemap.xml".to_string()));
}

#[test]
fn test_parse_sitemap_url_without_scheme() {
    let result = parse_sitemap_url("example.com/sitemap.xml");
    assert_eq!(result, Some("https://example.com/sitemap.xml".to_string()));
}

#[test]
fn test_parse_sitemap_url_http_preserved() {
    let result = parse_sitemap_url("http://example.com/sitemap.xml");
    assert_eq!(result, Some("http://example.com/sitemap.xml".to_string()));
}

#[test]
fn test_parse_sitemap_url_rejects_other_schemes() {
    assert_eq!(parse_sitemap_url("ftp://example.com/sitemap.xml"), None);
}

#[test]
fn test_parse_sitemap_url_rejects_garbage() {
    assert_eq!(parse_sitemap_url("not a url!!!"), None);
    assert_eq!(parse_sitemap_url(""), None);
    assert_eq!(parse_sitemap_url("   "), None);
}

#[test]
fn test_parse_sitemap_url_trims_whitespace() {
    let result = parse_sitemap_url("  https://example.com/sitemap.xml  ");
    assert_eq!(result, Some("https://example.com/sitemap.xml".to_string()));
}

#[test]
fn test_resolve_output_path_plain() {
    let path = resolve_output_path("reports/out.txt");
    assert_eq!(path.to_str().unwrap(), "reports/out.txt");
}

#[test]
fn test_resolve_output_path_tilde() {
    let path = resolve_output_path("~/out.txt");
    // Expansion replaces ~ with the home directory
    assert!(!path.to_str().unwrap().starts_with('~'));
    assert!(path.to_str().unwrap().ends_with("out.txt"));
}
