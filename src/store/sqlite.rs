use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{FileAdmission, Store};
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;
use crate::vcs::Provider;

const USER_COLUMNS: &str = "id, email, display_name, plan_id, created_at, updated_at";
const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at";
const PROJECT_COLUMNS: &str = "project_id, owner_user_id, name, summary, referenced_repos, \
     packages, file_refs, goal, created_at, last_active_at";
const FILE_COLUMNS: &str =
    "file_id, project_id, owner_user_id, name, file_type, content, created_at, last_active_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::CorruptRecord(e.to_string()))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        plan_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        user_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        project_id: row.get(0)?,
        owner_user_id: row.get(1)?,
        name: row.get(2)?,
        summary: row.get(3)?,
        referenced_repos: json_column(row, 4)?,
        packages: json_column(row, 5)?,
        file_refs: json_column(row, 6)?,
        goal: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        last_active_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        file_id: row.get(0)?,
        project_id: row.get(1)?,
        owner_user_id: row.get(2)?,
        name: row.get(3)?,
        file_type: row.get(4)?,
        content: json_column(row, 5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        last_active_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

impl SqliteStore {
    fn query_projects(&self, filter: &str, key: &str) -> Result<Vec<Project>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE {filter} = ?1
             ORDER BY created_at, project_id"
        ))?;
        let rows = stmt.query_map(params![key], project_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn query_files(&self, filter: &str, key: &str) -> Result<Vec<FileRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE {filter} = ?1
             ORDER BY created_at, file_id"
        ))?;
        let rows = stmt.query_map(params![key], file_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, email, display_name, plan_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.display_name,
                user.plan_id,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn set_user_plan(&self, id: &str, plan_id: Option<&str>) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET plan_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![plan_id, format_datetime(&Utc::now()), id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Provider access tokens

    fn set_access_token(&self, user_id: &str, provider: Provider, token: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO user_access_tokens (user_id, provider, token, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, provider) DO UPDATE SET
                token = excluded.token,
                updated_at = excluded.updated_at",
            params![user_id, provider.as_str(), token, format_datetime(&Utc::now())],
        )?;
        Ok(())
    }

    fn list_access_tokens(&self, user_id: &str) -> Result<HashMap<Provider, String>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT provider, token FROM user_access_tokens WHERE user_id = ?1")?;

        let rows = stmt.query_map(params![user_id], |row| {
            let provider = row
                .get::<_, String>(0)?
                .parse::<Provider>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into()))?;
            Ok((provider, row.get::<_, String>(1)?))
        })?;

        rows.collect::<std::result::Result<HashMap<_, _>, _>>()
            .map_err(Error::from)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::TokenLookupCollision)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
            params![lookup],
            token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Project operations

    fn create_project_capped(&self, project: &Project, max_projects: u32) -> Result<bool> {
        let rows = self.conn().execute(
            "INSERT INTO projects (project_id, owner_user_id, name, summary, referenced_repos,
                                   packages, file_refs, goal, created_at, last_active_at)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
             WHERE (SELECT COUNT(*) FROM projects WHERE owner_user_id = ?2) < ?11",
            params![
                project.project_id,
                project.owner_user_id,
                project.name,
                project.summary,
                to_json(&project.referenced_repos)?,
                to_json(&project.packages)?,
                to_json(&project.file_refs)?,
                project.goal,
                format_datetime(&project.created_at),
                format_datetime(&project.last_active_at),
                max_projects,
            ],
        )?;
        Ok(rows > 0)
    }

    fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = ?1"),
            params![project_id],
            project_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_user_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        self.query_projects("owner_user_id", user_id)
    }

    fn count_user_projects(&self, user_id: &str) -> Result<u32> {
        let conn = self.conn();
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE owner_user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn update_project(&self, project: &Project) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE projects SET name = ?1, summary = ?2, referenced_repos = ?3, packages = ?4,
                                 file_refs = ?5, goal = ?6, last_active_at = ?7
             WHERE project_id = ?8",
            params![
                project.name,
                project.summary,
                to_json(&project.referenced_repos)?,
                to_json(&project.packages)?,
                to_json(&project.file_refs)?,
                project.goal,
                format_datetime(&project.last_active_at),
                project.project_id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_project(&self, project_id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let files = tx.execute("DELETE FROM files WHERE project_id = ?1", params![project_id])?;
        let rows = tx.execute(
            "DELETE FROM projects WHERE project_id = ?1",
            params![project_id],
        )?;

        tx.commit()?;
        if rows > 0 && files > 0 {
            tracing::debug!("Deleted {files} files with project {project_id}");
        }
        Ok(rows > 0)
    }

    // File operations

    fn create_file_capped(&self, file: &FileRecord, max_files: u32) -> Result<FileAdmission> {
        let conn = self.conn();
        let rows = conn.execute(
            "INSERT INTO files (file_id, project_id, owner_user_id, name, file_type, content,
                                created_at, last_active_at)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8
             WHERE EXISTS (SELECT 1 FROM projects WHERE project_id = ?2 AND owner_user_id = ?3)
               AND (SELECT COUNT(*) FROM files WHERE project_id = ?2) < ?9",
            params![
                file.file_id,
                file.project_id,
                file.owner_user_id,
                file.name,
                file.file_type,
                to_json(&file.content)?,
                format_datetime(&file.created_at),
                format_datetime(&file.last_active_at),
                max_files,
            ],
        )?;
        if rows > 0 {
            return Ok(FileAdmission::Inserted);
        }

        let parent_exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM projects WHERE project_id = ?1 AND owner_user_id = ?2)",
            params![file.project_id, file.owner_user_id],
            |row| row.get(0),
        )?;
        Ok(if parent_exists {
            FileAdmission::LimitReached
        } else {
            FileAdmission::ParentMissing
        })
    }

    fn get_file(&self, file_id: &str) -> Result<Option<FileRecord>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FILE_COLUMNS} FROM files WHERE file_id = ?1"),
            params![file_id],
            file_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_user_files(&self, user_id: &str) -> Result<Vec<FileRecord>> {
        self.query_files("owner_user_id", user_id)
    }

    fn list_project_files(&self, project_id: &str) -> Result<Vec<FileRecord>> {
        self.query_files("project_id", project_id)
    }

    fn count_project_files(&self, project_id: &str) -> Result<u32> {
        let conn = self.conn();
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM files WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn update_file(&self, file: &FileRecord) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE files SET name = ?1, file_type = ?2, content = ?3, last_active_at = ?4
             WHERE file_id = ?5",
            params![
                file.name,
                file.file_type,
                to_json(&file.content)?,
                format_datetime(&file.last_active_at),
                file.file_id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_file(&self, file_id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM files WHERE file_id = ?1", params![file_id])?;
        Ok(rows > 0)
    }

    // Message log

    fn append_message(&self, user_id: &str, message: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let raw: Option<String> = tx
            .query_row(
                "SELECT messages FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        let raw = raw.ok_or(Error::NotFound)?;

        let mut log: MessageLog = serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Resetting unreadable message log for {user_id}: {e}");
            MessageLog::new()
        });
        log.push(message);

        tx.execute(
            "UPDATE users SET messages = ?1 WHERE id = ?2",
            params![to_json(&log)?, user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn list_messages(&self, user_id: &str) -> Result<MessageLog> {
        let conn = self.conn();
        let raw: Option<String> = conn
            .query_row(
                "SELECT messages FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        let raw = raw.ok_or(Error::NotFound)?;
        serde_json::from_str(&raw).map_err(|e| Error::CorruptRecord(e.to_string()))
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> SqliteStore {
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        store
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            display_name: id.to_string(),
            plan_id: Some("tier-a".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn project(id: &str, owner: &str) -> Project {
        Project {
            project_id: id.to_string(),
            owner_user_id: owner.to_string(),
            name: format!("Project {id}"),
            summary: String::new(),
            referenced_repos: vec!["https://github.com/acme/widgets".to_string()],
            packages: vec![],
            file_refs: vec![],
            goal: "ship it".to_string(),
            created_at: Utc::now(),
            last_active_at: Utc::now(),
        }
    }

    fn file(id: &str, project_id: &str, owner: &str) -> FileRecord {
        FileRecord {
            file_id: id.to_string(),
            project_id: project_id.to_string(),
            owner_user_id: owner.to_string(),
            name: format!("{id}.md"),
            file_type: "notes".to_string(),
            content: FileContent::Lines(vec!["first".to_string(), "second".to_string()]),
            created_at: Utc::now(),
            last_active_at: Utc::now(),
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in ["users", "user_access_tokens", "tokens", "projects", "files"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_user_plan_and_access_tokens() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();

        assert!(matches!(
            store.create_user(&user("u1")),
            Err(Error::AlreadyExists)
        ));

        store.set_user_plan("u1", None).unwrap();
        assert_eq!(store.get_user("u1").unwrap().unwrap().plan_id, None);
        assert!(matches!(
            store.set_user_plan("missing", Some("tier-b")),
            Err(Error::NotFound)
        ));

        store.set_access_token("u1", Provider::GitHub, "old").unwrap();
        store.set_access_token("u1", Provider::GitHub, "new").unwrap();
        store.set_access_token("u1", Provider::GitLab, "gl").unwrap();

        let tokens = store.list_access_tokens("u1").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[&Provider::GitHub], "new");
        assert_eq!(tokens[&Provider::GitLab], "gl");

        let by_email = store.get_user_by_email("u1@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, "u1");
    }

    #[test]
    fn test_token_lookup_collision() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();

        let token1 = Token {
            id: "token-1".to_string(),
            token_hash: "hash1".to_string(),
            token_lookup: "lookup12".to_string(),
            user_id: "u1".to_string(),
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
        };
        store.create_token(&token1).unwrap();

        let token2 = Token {
            id: "token-2".to_string(),
            token_hash: "hash2".to_string(),
            ..token1.clone()
        };
        let result = store.create_token(&token2);
        assert!(matches!(result, Err(Error::TokenLookupCollision)));

        store.update_token_last_used("token-1").unwrap();
        let fetched = store.get_token_by_lookup("lookup12").unwrap().unwrap();
        assert_eq!(fetched.id, "token-1");
        assert!(fetched.last_used_at.is_some());
    }

    #[test]
    fn test_project_cap_is_enforced_on_insert() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();
        store.create_user(&user("u2")).unwrap();

        assert!(store.create_project_capped(&project("p1", "u1"), 2).unwrap());
        assert!(store.create_project_capped(&project("p2", "u1"), 2).unwrap());
        assert!(!store.create_project_capped(&project("p3", "u1"), 2).unwrap());
        assert_eq!(store.count_user_projects("u1").unwrap(), 2);
        assert!(store.get_project("p3").unwrap().is_none());

        // Caps are per owner
        assert!(store.create_project_capped(&project("p4", "u2"), 1).unwrap());
    }

    #[test]
    fn test_project_update_persists_lists() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();
        store.create_project_capped(&project("p1", "u1"), 1).unwrap();

        let mut updated = store.get_project("p1").unwrap().unwrap();
        updated.packages = vec!["serde".to_string(), "tokio".to_string()];
        updated.summary = "a summary".to_string();
        store.update_project(&updated).unwrap();

        let fetched = store.get_project("p1").unwrap().unwrap();
        assert_eq!(fetched.packages, vec!["serde", "tokio"]);
        assert_eq!(fetched.summary, "a summary");
        assert_eq!(fetched.referenced_repos, updated.referenced_repos);

        let missing = project("nope", "u1");
        assert!(matches!(store.update_project(&missing), Err(Error::NotFound)));
    }

    #[test]
    fn test_file_cap_is_per_project() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();
        store.create_project_capped(&project("p1", "u1"), 5).unwrap();
        store.create_project_capped(&project("p2", "u1"), 5).unwrap();

        let insert = |id: &str, project_id: &str| {
            store.create_file_capped(&file(id, project_id, "u1"), 2).unwrap()
        };
        assert_eq!(insert("f1", "p1"), FileAdmission::Inserted);
        assert_eq!(insert("f2", "p1"), FileAdmission::Inserted);
        assert_eq!(insert("f3", "p1"), FileAdmission::LimitReached);
        assert_eq!(insert("f4", "p2"), FileAdmission::Inserted);

        assert_eq!(store.count_project_files("p1").unwrap(), 2);
        assert_eq!(store.list_user_files("u1").unwrap().len(), 3);

        let fetched = store.get_file("f1").unwrap().unwrap();
        assert_eq!(fetched.content, file("f1", "p1", "u1").content);
        assert_eq!(fetched.file_type, "notes");
    }

    #[test]
    fn test_file_insert_requires_owned_parent() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();
        store.create_user(&user("u2")).unwrap();
        store.create_project_capped(&project("p1", "u1"), 5).unwrap();

        assert_eq!(
            store.create_file_capped(&file("f1", "no-such-project", "u1"), 3).unwrap(),
            FileAdmission::ParentMissing
        );
        assert_eq!(
            store.create_file_capped(&file("f2", "p1", "u2"), 3).unwrap(),
            FileAdmission::ParentMissing
        );

        // A project deleted after the handler looked it up leaves no orphan
        assert!(store.delete_project("p1").unwrap());
        assert_eq!(
            store.create_file_capped(&file("f3", "p1", "u1"), 3).unwrap(),
            FileAdmission::ParentMissing
        );
        assert!(store.list_user_files("u1").unwrap().is_empty());
        assert!(store.list_user_files("u2").unwrap().is_empty());
    }

    #[test]
    fn test_delete_project_removes_its_files() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();
        store.create_project_capped(&project("p1", "u1"), 5).unwrap();
        store.create_project_capped(&project("p2", "u1"), 5).unwrap();
        store.create_file_capped(&file("f1", "p1", "u1"), 5).unwrap();
        store.create_file_capped(&file("f2", "p1", "u1"), 5).unwrap();
        store.create_file_capped(&file("f3", "p2", "u1"), 5).unwrap();

        assert!(store.delete_project("p1").unwrap());
        assert!(store.list_project_files("p1").unwrap().is_empty());
        assert_eq!(store.list_project_files("p2").unwrap().len(), 1);
        assert!(!store.delete_project("p1").unwrap());
    }

    #[test]
    fn test_message_log_keeps_most_recent() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create_user(&user("u1")).unwrap();

        assert!(store.list_messages("u1").unwrap().is_empty());
        for i in 0..20 {
            store.append_message("u1", &format!("message {i}")).unwrap();
        }

        let log = store.list_messages("u1").unwrap();
        assert_eq!(log.len(), MESSAGE_LOG_CAPACITY);
        assert_eq!(log.iter().next(), Some("message 5"));
        assert_eq!(log.iter().last(), Some("message 19"));

        assert!(matches!(
            store.append_message("missing", "hi"),
            Err(Error::NotFound)
        ));
    }
}
