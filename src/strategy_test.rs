use super::*;

// =============================================================================
// AuthAction
// =============================================================================

#[test]
fn default_action_is_render() {
    assert_eq!(AuthAction::default(), AuthAction::Render);
}

#[test]
fn action_display_uses_screaming_names() {
    assert_eq!(AuthAction::RedirectToLogin.to_string(), "REDIRECT_TO_LOGIN");
    assert_eq!(AuthAction::ShowLoader.to_string(), "SHOW_LOADER");
}

#[test]
fn action_parses_case_insensitively() {
    assert_eq!("return_null".parse::<AuthAction>().unwrap(), AuthAction::ReturnNull);
    assert_eq!(" REDIRECT_TO_APP ".parse::<AuthAction>().unwrap(), AuthAction::RedirectToApp);
}

#[test]
fn action_parse_rejects_unknown() {
    let err = "REDIRECT".parse::<AuthAction>().unwrap_err();
    assert_eq!(err, ConfigError::UnknownAction("REDIRECT".into()));
}

#[test]
fn action_serde_matches_display() {
    for action in AuthAction::ALL {
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, format!("\"{action}\""));
    }
}

#[test]
fn only_redirect_variants_are_redirects() {
    let redirects: Vec<_> = AuthAction::ALL.into_iter().filter(|a| a.is_redirect()).collect();
    assert_eq!(redirects, vec![AuthAction::RedirectToLogin, AuthAction::RedirectToApp]);
}

// =============================================================================
// Bucket
// =============================================================================

#[test]
fn authed_wins_regardless_of_init() {
    assert_eq!(Bucket::classify(true, false), Bucket::Authed);
    assert_eq!(Bucket::classify(true, true), Bucket::Authed);
}

#[test]
fn unauthed_split_by_init() {
    assert_eq!(Bucket::classify(false, false), Bucket::UnauthedBeforeInit);
    assert_eq!(Bucket::classify(false, true), Bucket::UnauthedAfterInit);
}

#[test]
fn bucket_option_names() {
    assert_eq!(Bucket::Authed.option_name(), "when_authed");
    assert_eq!(Bucket::UnauthedBeforeInit.option_name(), "when_unauthed_before_init");
    assert_eq!(Bucket::UnauthedAfterInit.option_name(), "when_unauthed_after_init");
}
