//! The `manage_users.sh` management script

use chrono::{DateTime, Local};

use crate::session::ImportSession;

use super::{TIMESTAMP_FORMAT, single_line};

const SCRIPT_BODY: &str = r#"
# Function to display all users
list_users() {
    echo "Available users:"
    for username in "${!users_data[@]}"; do
        echo "  $username: ${users_data[$username]}"
    done | sort
}

# Function to display one user and their config file
show_user() {
    local username="$1"
    if [ -z "$username" ] || [ -z "${users_data[$username]+x}" ]; then
        echo "Unknown user: $username" >&2
        exit 1
    fi
    echo "$username: ${users_data[$username]}"
    echo "Config: $SCRIPT_DIR/$username/$ENV_FILE"
}

usage() {
    echo "Usage: $0 {list|show <username>}"
    echo ""
    echo "Commands:"
    echo "  list            - List all imported users"
    echo "  show <username> - Show a user and the path of their config file"
}

# Main menu
case "$1" in
    "list")
        list_users
        ;;
    "show")
        show_user "$2"
        ;;
    *)
        usage
        ;;
esac
"#;

/// Render the bash script that embeds the username -> display name table
pub fn render_script(
    session: &ImportSession,
    env_file_name: &str,
    generated_at: &DateTime<Local>,
) -> String {
    let mut out = String::new();

    out.push_str("#!/bin/bash\n");
    out.push_str("# Auto-generated WorkSpaces setup script\n");
    out.push_str(&format!(
        "# Generated on: {}\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.push('\n');
    out.push_str("SCRIPT_DIR=\"$(cd \"$(dirname \"${BASH_SOURCE[0]}\")\" && pwd)\"\n");
    out.push_str(&format!("ENV_FILE=\"{}\"\n", bash_quoted(env_file_name)));
    out.push('\n');
    out.push_str("# Registration code\n");
    out.push_str(&format!(
        "REGISTRATION_CODE=\"{}\"\n",
        bash_quoted(&session.registration_code)
    ));
    out.push('\n');
    out.push_str("# User data\n");
    out.push_str("declare -A users_data\n");

    for user in session.users() {
        out.push_str(&format!(
            "users_data[\"{}\"]=\"{}\"\n",
            bash_quoted(&user.username),
            bash_quoted(&user.display_name())
        ));
    }

    out.push_str(SCRIPT_BODY);
    out
}

/// Escape for the inside of a bash double-quoted string
fn bash_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in single_line(value).chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserRecord;
    use chrono::TimeZone;

    fn session() -> ImportSession {
        let mut session = ImportSession::new("SLiad+ABC");
        session.insert(UserRecord {
            last_name: "鈴木".to_string(),
            first_name: "ボブ".to_string(),
            full_name_en: "Bob Suzuki".to_string(),
            ..UserRecord::new("800000002")
        });
        session.insert(UserRecord {
            last_name: "佐藤".to_string(),
            first_name: "アリス".to_string(),
            full_name_en: "Alice Sato".to_string(),
            ..UserRecord::new("800000001")
        });
        session
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_header_and_table() {
        let out = render_script(&session(), ".env.local", &at());

        assert!(out.starts_with("#!/bin/bash\n"));
        assert!(out.contains("# Generated on: 2024-04-01 09:30:00\n"));
        assert!(out.contains("REGISTRATION_CODE=\"SLiad+ABC\"\n"));
        assert!(out.contains("ENV_FILE=\".env.local\"\n"));
        assert!(out.contains("users_data[\"800000001\"]=\"Alice Sato (佐藤 アリス)\"\n"));
        assert!(out.contains("users_data[\"800000002\"]=\"Bob Suzuki (鈴木 ボブ)\"\n"));
    }

    #[test]
    fn test_commands_present() {
        let out = render_script(&session(), ".env.local", &at());

        assert!(out.contains("\"list\")\n        list_users"));
        assert!(out.contains("\"show\")\n        show_user \"$2\""));
        assert!(out.contains("Usage: $0 {list|show <username>}"));
        assert!(out.ends_with("esac\n"));
    }

    #[test]
    fn test_display_names_are_escaped() {
        let mut session = ImportSession::new("$(rm -rf /)");
        session.insert(UserRecord {
            full_name_en: "Eve \"`whoami`\" $HOME".to_string(),
            ..UserRecord::new("800000005")
        });

        let out = render_script(&session, ".env.local", &at());
        assert!(out.contains("REGISTRATION_CODE=\"\\$(rm -rf /)\"\n"));
        assert!(out.contains("=\"Eve \\\"\\`whoami\\`\\\" \\$HOME ( )\"\n"));
    }

    #[test]
    fn test_empty_session() {
        let out = render_script(&ImportSession::default(), ".env.local", &at());
        assert!(out.contains("declare -A users_data\n\n# Function to display all users"));
    }

    #[cfg(unix)]
    fn run_script(script: &std::path::Path, args: &[&str]) -> (bool, String) {
        let output = std::process::Command::new("bash")
            .arg(script)
            .args(args)
            .env("LC_ALL", "C")
            .output()
            .unwrap();
        (
            output.status.success(),
            String::from_utf8(output.stdout).unwrap(),
        )
    }

    #[cfg(unix)]
    #[test]
    fn test_script_commands_run() {
        use crate::generate::{EXECUTABLE, write_artifact};

        let mut session = ImportSession::new("SLiad+ABC");
        for (name, full) in [
            ("800000010", "Dave Ito"),
            ("800000002", "Bob Suzuki"),
            ("800000001", "Alice Sato"),
        ] {
            session.insert(UserRecord {
                full_name_en: full.to_string(),
                last_name: "L".to_string(),
                first_name: "F".to_string(),
                ..UserRecord::new(name)
            });
        }

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("manage_users.sh");
        write_artifact(
            &script,
            &render_script(&session, ".env.local", &at()),
            Some(EXECUTABLE),
        )
        .unwrap();

        let (ok, out) = run_script(&script, &["list"]);
        assert!(ok);
        assert_eq!(
            out,
            "Available users:\n\
             \x20 800000001: Alice Sato (L F)\n\
             \x20 800000002: Bob Suzuki (L F)\n\
             \x20 800000010: Dave Ito (L F)\n"
        );

        for args in [&[][..], &["help"][..], &["frobnicate"][..]] {
            let (ok, out) = run_script(&script, args);
            assert!(ok, "args {:?} should exit 0", args);
            assert!(out.starts_with("Usage: "), "args {:?}: {}", args, out);
            assert!(out.contains("list            - List all imported users"));
        }

        let (ok, out) = run_script(&script, &["show", "800000002"]);
        assert!(ok);
        assert!(out.contains("800000002: Bob Suzuki (L F)\n"));
        assert!(out.contains("/800000002/.env.local\n"));

        let (ok, _) = run_script(&script, &["show", "800000099"]);
        assert!(!ok);
    }
}
