//! Behaviour tests for desk state surviving a restart on the on-disk store.
//!
//! Each scenario opens a desk over a temporary data directory, mutates it,
//! then opens a second desk over a fresh store handle the way a restarted
//! process would. Setup steps are async helpers; outcome checks are
//! scenario steps.

use complaint_desk::domain::ports::StoreKey;
use complaint_desk::domain::{
    ComplaintId, Desk, HydrationIssueKind, HydrationReport, LoginCredentials, NewComplaint,
    Registration, RegistrationForm, Role, ThemePreference, User,
};
use complaint_desk::test_support::TempDataDir;
use rstest::{fixture, rstest};
use rstest_bdd_macros::then;
use serde_json::Value;

#[fixture]
fn data_dir() -> TempDataDir {
    TempDataDir::new()
}

fn alice() -> Registration {
    Registration::try_from_form(&RegistrationForm {
        name: "Alice",
        email: "a@x.com",
        password: "secret1",
        confirm_password: "secret1",
        role: Role::User,
    })
    .expect("valid registration")
}

fn stored_json(data_dir: &TempDataDir, file: &str) -> Value {
    let raw = data_dir.read_raw(file).expect("document written");
    serde_json::from_str(&raw).expect("document is JSON")
}

async fn a_desk_where_alice_has_registered(data_dir: &TempDataDir) -> User {
    let (mut desk, report) = data_dir.open().await;
    assert!(report.is_clean());
    desk.accounts_mut()
        .register(&alice())
        .await
        .expect("registration succeeds")
}

async fn the_desk_restarts(data_dir: &TempDataDir) -> (Desk, HydrationReport) {
    data_dir.open().await
}

#[then("Alice is still signed in without a stored credential")]
fn alice_is_still_signed_in(data_dir: &TempDataDir, registered: &User, desk: &Desk) {
    assert_eq!(desk.accounts().current_user(), Some(registered));
    let session = stored_json(data_dir, "currentUser.json");
    assert_eq!(session["version"], 1);
    assert_eq!(session["data"]["email"], "a@x.com");
    assert!(session["data"].get("password").is_none());
    assert!(session["data"].get("passwordHash").is_none());
}

#[then("the document is reported as corrupt")]
fn the_document_is_reported_corrupt(report: &HydrationReport, key: StoreKey) {
    assert!(matches!(
        report.issue_for(key),
        Some(HydrationIssueKind::Corrupt { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn session_survives_a_restart(data_dir: TempDataDir) {
    let registered = a_desk_where_alice_has_registered(&data_dir).await;
    let (desk, report) = the_desk_restarts(&data_dir).await;
    assert!(report.is_clean());
    alice_is_still_signed_in(&data_dir, &registered, &desk);
    assert_eq!(desk.accounts().account_count(), 3);
}

#[rstest]
#[tokio::test]
async fn complaints_and_theme_survive_a_restart(data_dir: TempDataDir) {
    {
        let (mut desk, _) = data_dir.open().await;
        let credentials =
            LoginCredentials::try_from_parts("manish@example.com", "password123", None)
                .expect("valid credentials");
        let owner = desk
            .accounts_mut()
            .login(&credentials)
            .await
            .expect("seeded login");
        let input = NewComplaint::try_from_parts(
            "Overflowing bin",
            "The bin outside block C has not been emptied.",
            "Sanitation",
            None,
        )
        .expect("valid complaint");
        let filed = desk
            .complaints_mut()
            .create(&owner, input)
            .await
            .expect("complaint filed");
        assert_eq!(filed.id().as_ref(), "CMP-004");
        desk.theme_mut()
            .set(ThemePreference::Dark)
            .await
            .expect("theme saved");
    }

    let (desk, report) = the_desk_restarts(&data_dir).await;
    assert!(report.is_clean());
    let id = ComplaintId::new("CMP-004").expect("complaint id");
    let complaint = desk.complaints().get(&id).expect("complaint reloaded");
    assert_eq!(complaint.title().as_ref(), "Overflowing bin");
    assert_eq!(desk.complaints().len(), 4);
    assert_eq!(desk.theme().preference(), ThemePreference::Dark);
}

#[rstest]
#[tokio::test]
async fn logout_removes_the_stored_session(data_dir: TempDataDir) {
    a_desk_where_alice_has_registered(&data_dir).await;
    assert!(data_dir.read_raw("currentUser.json").is_some());

    let (mut desk, _) = data_dir.open().await;
    desk.accounts_mut().logout().await.expect("logout succeeds");
    assert!(data_dir.read_raw("currentUser.json").is_none());

    let (desk, _) = the_desk_restarts(&data_dir).await;
    assert!(!desk.accounts().is_authenticated());
}

#[rstest]
#[case::not_json("users.json", "{not json", StoreKey::Users)]
#[case::wrong_shape("complaints.json", r#"{"version":1,"data":"oops"}"#, StoreKey::Complaints)]
#[tokio::test]
async fn corrupt_documents_fall_back_to_defaults(
    data_dir: TempDataDir,
    #[case] file: &str,
    #[case] contents: &str,
    #[case] key: StoreKey,
) {
    data_dir.open().await;
    data_dir.write_raw(file, contents);

    let (mut desk, report) = the_desk_restarts(&data_dir).await;
    the_document_is_reported_corrupt(&report, key);
    assert_eq!(desk.complaints().len(), 3);
    let credentials =
        LoginCredentials::try_from_parts("manish@example.com", "password123", None)
            .expect("valid credentials");
    desk.accounts_mut()
        .login(&credentials)
        .await
        .expect("seeded account usable after recovery");
}

#[rstest]
#[tokio::test]
async fn documents_from_a_newer_schema_are_reported(data_dir: TempDataDir) {
    data_dir.write_raw("theme.json", r#"{"version":7,"data":"dark"}"#);

    let (desk, report) = the_desk_restarts(&data_dir).await;
    assert_eq!(
        report.issue_for(StoreKey::Theme),
        Some(&HydrationIssueKind::UnsupportedVersion {
            expected: 1,
            found: 7
        })
    );
    assert_eq!(desk.theme().preference(), ThemePreference::System);
}
