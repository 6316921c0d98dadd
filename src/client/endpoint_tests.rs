use crate::client::endpoint::{API_VERSION, Endpoint};
use crate::shared::config::model::EnvironmentConfig;

fn environment(fqdn: &str, use_tls: bool) -> EnvironmentConfig {
    EnvironmentConfig {
        fqdn: fqdn.to_string(),
        use_tls,
    }
}

#[test]
fn renders_secure_url_with_pinned_api_version() {
    let endpoint = Endpoint::build(&environment("env.example.com", true), "events", API_VERSION);

    assert_eq!(
        endpoint.as_str(),
        "wss://env.example.com/events?api-version=2016-12-12"
    );
}

#[test]
fn leading_slash_in_resource_path_is_normalized() {
    let endpoint = Endpoint::build(
        &environment("env.example.com", true),
        "/aggregates",
        API_VERSION,
    );

    assert_eq!(
        endpoint.as_str(),
        "wss://env.example.com/aggregates?api-version=2016-12-12"
    );
}

#[test]
fn plain_scheme_for_loopback_servers() {
    let endpoint = Endpoint::build(&environment("127.0.0.1:9400", false), "events", API_VERSION);

    assert_eq!(
        endpoint.as_str(),
        "ws://127.0.0.1:9400/events?api-version=2016-12-12"
    );
}

#[test]
fn api_version_override_is_honored() {
    let endpoint = Endpoint::build(&environment("env.example.com", true), "events", "2020-07-31");

    assert_eq!(
        endpoint.as_str(),
        "wss://env.example.com/events?api-version=2020-07-31"
    );
}
