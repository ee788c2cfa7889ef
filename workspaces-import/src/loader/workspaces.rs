//! Read the registration code and users from the WorkSpaces connection export

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Range};

use crate::config::WorkspacesLayout;
use crate::markers::{Field, MarkerTable};
use crate::session::{ImportSession, UserRecord, is_safe_username};
use crate::sheet::{self, SheetRow, Workbook};

/// Column offsets from the username column
mod cols {
    pub const LAST_NAME: usize = 1;
    pub const FIRST_NAME: usize = 2;
    pub const FULL_NAME_EN: usize = 3;
    pub const INITIAL_PASSWORD: usize = 4;
}

/// Load the WorkSpaces export into a new session.
///
/// Any failure here is fatal for the run.
pub fn load_workspaces(
    path: &Path,
    layout: &WorkspacesLayout,
    markers: &MarkerTable,
) -> Result<ImportSession> {
    let mut workbook = Workbook::open(path)?;

    let login = workbook
        .range(&layout.login_sheet)
        .context("Failed to read login info sheet")?;
    let registration_code = read_registration_code(&login, layout.label_column, markers);

    let users = workbook
        .range(&layout.users_sheet)
        .context("Failed to read sign-in info sheet")?;

    let mut session = ImportSession::new(registration_code.clone().unwrap_or_default());
    for user in read_users(&users, layout) {
        session.insert(user);
    }

    match registration_code {
        Some(code) => log::info!("Registration code: {}", code),
        None => log::warn!(
            "No '{}' label found in sheet '{}', registration code left empty",
            markers.marker(Field::RegistrationCode).unwrap_or_default(),
            layout.login_sheet
        ),
    }
    log::info!(
        "Loaded {} users from {}",
        session.len(),
        path.display()
    );

    Ok(session)
}

/// The value next to the first registration code label in `label_col`.
///
/// Later labels are ignored. A label with a blank neighbour still counts as
/// the first match and yields an empty code.
pub fn read_registration_code(
    range: &Range<Data>,
    label_col: usize,
    markers: &MarkerTable,
) -> Option<String> {
    let marker = markers.marker(Field::RegistrationCode)?;

    sheet::rows(range)
        .find(|row| markers.lookup(&row.text(label_col)) == Some(Field::RegistrationCode))
        .map(|row| row.labeled_value(label_col, marker).unwrap_or_default())
}

/// All rows whose username starts with the configured prefix, in row order
pub fn read_users(range: &Range<Data>, layout: &WorkspacesLayout) -> Vec<UserRecord> {
    let mut users = Vec::new();

    for (row_idx, row) in sheet::rows(range).enumerate() {
        match parse_user_row(&row, layout) {
            Some(user) => users.push(user),
            None => {
                if !row.is_blank() {
                    log::debug!(
                        "Skipping row {}: '{}' is not a user",
                        row_idx + 1,
                        row.text(layout.username_column)
                    );
                }
            }
        }
    }

    users
}

fn parse_user_row(row: &SheetRow<'_>, layout: &WorkspacesLayout) -> Option<UserRecord> {
    let col = layout.username_column;
    let username = row.text(col);

    if username.is_empty() || !username.starts_with(&layout.username_prefix) {
        return None;
    }

    if !is_safe_username(&username) {
        log::warn!(
            "Skipping user '{}': usernames must not contain path separators",
            username
        );
        return None;
    }

    Some(UserRecord {
        last_name: row.text(col + cols::LAST_NAME),
        first_name: row.text(col + cols::FIRST_NAME),
        full_name_en: row.text(col + cols::FULL_NAME_EN),
        initial_password: row.text(col + cols::INITIAL_PASSWORD),
        ..UserRecord::new(username)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(rows: &[&[&str]]) -> Range<Data> {
        let height = rows.len().max(1) as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1).max(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    range.set_value((r as u32, c as u32), Data::String(value.to_string()));
                }
            }
        }
        range
    }

    #[test]
    fn test_registration_code_first_match_wins() {
        let login = range(&[
            &["", "接続情報", ""],
            &["", "登録コード", "SLiad+FIRST"],
            &["", "登録コード", "SLiad+SECOND"],
        ]);
        let code = read_registration_code(&login, 1, &MarkerTable::default());
        assert_eq!(code.as_deref(), Some("SLiad+FIRST"));
    }

    #[test]
    fn test_registration_code_wrong_column_not_matched() {
        let login = range(&[&["登録コード", "SLiad+X", ""]]);
        assert_eq!(read_registration_code(&login, 1, &MarkerTable::default()), None);
    }

    #[test]
    fn test_registration_code_missing() {
        let login = range(&[&["", "something", "else"]]);
        assert_eq!(read_registration_code(&login, 1, &MarkerTable::default()), None);
    }

    #[test]
    fn test_read_users_filters_by_prefix() {
        let users = range(&[
            &["", "ユーザー名", "姓", "名", "氏名(英)", "初期パスワード"],
            &["", "800000001", "佐藤", "アリス", "Alice Sato", "pw-alice"],
            &["", "", "", "", "", ""],
            &["", "700000001", "x", "x", "x", "x"],
            &["", "800000002", "鈴木", "ボブ", "Bob Suzuki", "pw-bob"],
            &["", "合計", "", "", "", ""],
        ]);

        let loaded = read_users(&users, &WorkspacesLayout::default());
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|u| u.username.starts_with("800000")));

        assert_eq!(loaded[0].username, "800000001");
        assert_eq!(loaded[0].last_name, "佐藤");
        assert_eq!(loaded[0].first_name, "アリス");
        assert_eq!(loaded[0].full_name_en, "Alice Sato");
        assert_eq!(loaded[0].initial_password, "pw-alice");
        assert_eq!(loaded[0].mfa_secret, None);
        assert_eq!(loaded[1].username, "800000002");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let users = range(&[&["", "800000001", "佐藤"]]);
        let loaded = read_users(&users, &WorkspacesLayout::default());

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].last_name, "佐藤");
        assert_eq!(loaded[0].first_name, "");
        assert_eq!(loaded[0].initial_password, "");
    }

    #[test]
    fn test_numeric_username_cell() {
        let mut users = Range::new((0, 0), (0, 2));
        users.set_value((0, 1), Data::Float(800000001.0));
        users.set_value((0, 2), Data::String("佐藤".to_string()));

        let loaded = read_users(&users, &WorkspacesLayout::default());
        assert_eq!(loaded[0].username, "800000001");
    }

    #[test]
    fn test_custom_prefix_and_column() {
        let layout = WorkspacesLayout {
            username_column: 0,
            username_prefix: "42".to_string(),
            ..Default::default()
        };
        let users = range(&[&["4200", "L", "F", "Full", "pw"], &["800000001", "", "", "", ""]]);

        let loaded = read_users(&users, &layout);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].username, "4200");
        assert_eq!(loaded[0].initial_password, "pw");
    }

    #[test]
    fn test_path_like_usernames_rejected() {
        let users = range(&[
            &["", "800000/../../escaped", "x", "x", "x", "pw"],
            &["", "800000\\..\\escaped", "x", "x", "x", "pw"],
            &["", "800000001", "佐藤", "アリス", "Alice Sato", "pw-alice"],
        ]);

        let loaded = read_users(&users, &WorkspacesLayout::default());
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].username, "800000001");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = load_workspaces(
            Path::new("/nonexistent/workspaces.xlsx"),
            &WorkspacesLayout::default(),
            &MarkerTable::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to open spreadsheet"));
    }
}
