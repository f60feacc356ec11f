//! Property tests: the pipeline is total and never echoes hostile input.

use proptest::prelude::*;

use locale_gatekeeper::config::GatekeeperConfig;
use locale_gatekeeper::gatekeeper::{GateAction, Gatekeeper, RequestDescriptor};
use locale_gatekeeper::security::sanitizer::{find_hostile, sanitize_locale_candidate};

fn gatekeeper() -> Gatekeeper {
    Gatekeeper::from_config(&GatekeeperConfig::default()).unwrap()
}

fn hostile_fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "..", "%2e%2e", "<script>", "%3Cimg%3E", "\"", "'", "%00", "\r\n", "%0d%0a",
    ])
}

proptest! {
    #[test]
    fn test_pipeline_is_total(target in ".{0,64}", cookie in ".{0,16}", accept in ".{0,32}") {
        let request = RequestDescriptor::parse(&target)
            .with_cookie("locale", &cookie)
            .with_header("accept-language", &accept);
        let outcome = gatekeeper().evaluate(&request);

        if outcome.action != GateAction::Bypass {
            let locale = outcome.response.header("x-locale").unwrap();
            prop_assert!(locale == "en" || locale == "es");
        }
        if let Some(location) = outcome.response.redirect_to() {
            prop_assert!(location.starts_with("/en") || location.starts_with("/es"));
            prop_assert!(find_hostile(location).is_none(), "hostile location {:?}", location);
        }
    }

    #[test]
    fn test_hostile_path_segments_are_dropped(
        prefix in "[a-z]{1,8}",
        bad in hostile_fragment(),
        suffix in "[a-z]{1,8}",
    ) {
        let target = format!("/{}/{}{}/{}", prefix, suffix, bad, suffix);
        let outcome = gatekeeper().evaluate(&RequestDescriptor::parse(&target));
        let location = outcome.response.redirect_to().unwrap_or("");
        prop_assert!(!location.contains(bad));
        prop_assert!(find_hostile(location).is_none());
    }

    #[test]
    fn test_sanitizer_rejects_hostile_candidates(
        left in "[a-z]{0,3}",
        bad in hostile_fragment(),
        right in "[a-z]{0,3}",
    ) {
        let candidate = format!("{}{}{}", left, bad, right);
        prop_assert!(sanitize_locale_candidate(&candidate).is_rejected());
    }

    #[test]
    fn test_auth_error_token_is_always_encoded(token in ".{1,40}") {
        let target = format!("/auth/signin?error={}", urlencoding::encode(&token));
        let outcome = gatekeeper().evaluate(&RequestDescriptor::parse(&target));
        prop_assert_eq!(outcome.action, GateAction::Redirect);
        let location = outcome.response.redirect_to().unwrap();
        prop_assert!(location.starts_with("/en/auth/error?error="));
        prop_assert!(find_hostile(location).is_none());
    }
}
