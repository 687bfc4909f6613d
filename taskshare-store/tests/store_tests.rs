use chrono::Utc;
use pretty_assertions::assert_eq;
use taskshare_store::{
    Database, GrantStore, Project, ProjectStore, StoreConfig, StoreError, Task, TaskStore, User,
    UserStore, IN_MEMORY, SCHEMA_VERSION,
};
use taskshare_types::{Capabilities, ProjectId, Resource, Standing, TargetUser, TaskId, UserId};

fn users(db: &Database, names: &[&str]) -> Vec<User> {
    db.write(|tx| {
        names
            .iter()
            .map(|name| UserStore::insert(tx, name, &format!("{name}@example.com")))
            .collect::<Result<Vec<_>, StoreError>>()
    })
    .unwrap()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let config = StoreConfig::default();
    assert_eq!(config.path, "taskshare.db");
    assert_eq!(config.busy_timeout_ms, 5_000);
    assert!(!config.is_in_memory());
    assert!(StoreConfig::in_memory().is_in_memory());
    assert_eq!(StoreConfig::in_memory().path, IN_MEMORY);
}

#[test]
fn config_deserializes_partial_json() {
    let config: StoreConfig = serde_json::from_str(r#"{"busy_timeout_ms": 250}"#).unwrap();
    assert_eq!(config.busy_timeout_ms, 250);
    assert_eq!(config.path, "taskshare.db");
    assert_eq!(config.busy_timeout().as_millis(), 250);
}

// ── Database ────────────────────────────────────────────────────

#[test]
fn on_disk_database_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("taskshare.db");
    let config = StoreConfig::at(path.to_string_lossy());

    let alice_id = {
        let db = Database::open(&config).unwrap();
        users(&db, &["alice"])[0].id
    };

    let db = Database::open(&config).unwrap();
    let alice = db.read(|tx| UserStore::get(tx, alice_id)).unwrap().unwrap();
    assert_eq!(alice.name, "alice");

    let version: i64 = db
        .read(|tx| {
            tx.query_row("PRAGMA user_version", [], |row| row.get(0))
                .map_err(StoreError::from)
        })
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[test]
fn failed_write_rolls_back() {
    let db = Database::open_in_memory().unwrap();
    let result: Result<(), StoreError> = db.write(|tx| {
        UserStore::insert(tx, "alice", "alice@example.com")?;
        UserStore::insert(tx, "alice", "other@example.com")?;
        Ok(())
    });
    assert!(result.unwrap_err().is_unique_violation());

    let alice = db.read(|tx| UserStore::find_by_name(tx, "alice")).unwrap();
    assert!(alice.is_none());
}

#[test]
fn clones_share_one_connection() {
    let db = Database::open_in_memory().unwrap();
    let other = db.clone();
    users(&db, &["alice"]);
    let found = other.read(|tx| UserStore::find_by_name(tx, "alice")).unwrap();
    assert!(found.is_some());
}

// ── Users ───────────────────────────────────────────────────────

#[test]
fn user_lookup_by_every_target() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);

    for target in [
        TargetUser::Id(alice.id),
        TargetUser::Name("alice".into()),
        TargetUser::Email("alice@example.com".into()),
    ] {
        let found = db.read(|tx| UserStore::find(tx, &target)).unwrap();
        assert_eq!(found.as_ref(), Some(&alice), "target {target}");
    }

    let missing = db
        .read(|tx| UserStore::find(tx, &TargetUser::Id(UserId::new())))
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn duplicate_name_or_email_is_conflict() {
    let db = Database::open_in_memory().unwrap();
    users(&db, &["alice"]);

    let err = db
        .write(|tx| UserStore::insert(tx, "alice", "new@example.com"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let err = db
        .write(|tx| UserStore::insert(tx, "alicia", "alice@example.com"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn identity_mirrors_user() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);
    let identity = alice.identity();
    assert_eq!(identity.id, alice.id);
    assert_eq!(identity.email, "alice@example.com");
}

// ── Projects ────────────────────────────────────────────────────

#[test]
fn project_update_and_delete() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);
    let mut project = Project::new(alice.id, "Garden", Some("veg patch".into()));
    db.write(|tx| ProjectStore::insert(tx, &project)).unwrap();

    project.completed = true;
    project.completed_at = Some(Utc::now());
    db.write(|tx| ProjectStore::update(tx, &project)).unwrap();
    let stored = db.read(|tx| ProjectStore::get(tx, project.id)).unwrap().unwrap();
    assert!(stored.completed);
    assert!(stored.completed_at.is_some());

    db.write(|tx| ProjectStore::delete(tx, project.id)).unwrap();
    let err = db
        .write(|tx| ProjectStore::delete(tx, project.id))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn completion_timestamp_must_match_flag() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);
    let mut project = Project::new(alice.id, "Garden", None);
    project.completed = true;

    let err = db
        .write(|tx| ProjectStore::insert(tx, &project))
        .unwrap_err();
    assert!(matches!(err, StoreError::Database(_)), "got {err:?}");
}

#[test]
fn projects_visible_to_author_and_grantees() {
    let db = Database::open_in_memory().unwrap();
    let [alice, bob, carol]: [User; 3] = users(&db, &["alice", "bob", "carol"]).try_into().unwrap();
    let project = Project::new(alice.id, "Garden", None);
    let editor = Capabilities::new(false, false, true, false);
    db.write(|tx| {
        ProjectStore::insert(tx, &project)?;
        GrantStore::insert(tx, bob.id, Resource::Project(project.id), editor)
    })
    .unwrap();

    let mine = db.read(|tx| ProjectStore::list_visible_to(tx, alice.id)).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].capabilities, Capabilities::FULL);

    let bobs = db.read(|tx| ProjectStore::list_visible_to(tx, bob.id)).unwrap();
    assert_eq!(bobs[0].capabilities, editor);

    let carols = db.read(|tx| ProjectStore::list_visible_to(tx, carol.id)).unwrap();
    assert!(carols.is_empty());
}

// ── Tasks ───────────────────────────────────────────────────────

#[test]
fn task_project_link() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);
    let project = Project::new(alice.id, "Garden", None);
    let mut linked = Task::new(alice.id, "Water plants");
    linked.project_id = Some(project.id);
    let loose = Task::new(alice.id, "Buy seeds");

    db.write(|tx| {
        ProjectStore::insert(tx, &project)?;
        TaskStore::insert(tx, &linked)?;
        TaskStore::insert(tx, &loose)
    })
    .unwrap();

    let links = db
        .read(|tx| {
            Ok::<_, StoreError>((
                TaskStore::project_of(tx, linked.id)?,
                TaskStore::project_of(tx, loose.id)?,
                TaskStore::project_of(tx, taskshare_types::TaskId::new())?,
            ))
        })
        .unwrap();
    assert_eq!(links, (Some(Some(project.id)), Some(None), None));

    let in_project = db.read(|tx| TaskStore::list_for_project(tx, project.id)).unwrap();
    assert_eq!(in_project, vec![linked]);
}

#[test]
fn task_with_unknown_project_is_missing_reference() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);
    let mut task = Task::new(alice.id, "Orphan");
    task.project_id = Some(ProjectId::new());

    let err = db.write(|tx| TaskStore::insert(tx, &task)).unwrap_err();
    assert!(matches!(err, StoreError::MissingReference(_)), "got {err:?}");
}

#[test]
fn deleting_project_detaches_tasks() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);
    let project = Project::new(alice.id, "Garden", None);
    let mut task = Task::new(alice.id, "Water plants");
    task.project_id = Some(project.id);
    db.write(|tx| {
        ProjectStore::insert(tx, &project)?;
        TaskStore::insert(tx, &task)
    })
    .unwrap();

    db.write(|tx| ProjectStore::delete(tx, project.id)).unwrap();
    let stored = db.read(|tx| TaskStore::get(tx, task.id)).unwrap().unwrap();
    assert_eq!(stored.project_id, None);
}

#[test]
fn foreign_keys_cannot_be_configured_off() {
    let config: StoreConfig =
        serde_json::from_str(r#"{"path": ":memory:", "foreign_keys": false}"#).unwrap();
    let db = Database::open(&config).unwrap();
    let enabled: bool = db
        .read(|tx| {
            tx.query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                .map_err(StoreError::from)
        })
        .unwrap();
    assert!(enabled);

    let alice = users(&db, &["alice"]).remove(0);
    let project = Project::new(alice.id, "Garden", None);
    let mut task = Task::new(alice.id, "Water plants");
    task.project_id = Some(project.id);
    db.write(|tx| {
        ProjectStore::insert(tx, &project)?;
        TaskStore::insert(tx, &task)?;
        GrantStore::insert(tx, alice.id, Resource::Project(project.id), Capabilities::FULL)
    })
    .unwrap();

    db.write(|tx| ProjectStore::delete(tx, project.id)).unwrap();
    let stored = db.read(|tx| TaskStore::get(tx, task.id)).unwrap().unwrap();
    assert_eq!(stored.project_id, None);
    let orphans: i64 = db
        .read(|tx| {
            tx.query_row(
                "SELECT COUNT(*) FROM project_grants WHERE project_id = ?1",
                [project.id.to_string()],
                |row| row.get(0),
            )
            .map_err(StoreError::from)
        })
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn visible_tasks_union_direct_and_inherited() {
    let db = Database::open_in_memory().unwrap();
    let [alice, bob, carol]: [User; 3] = users(&db, &["alice", "bob", "carol"]).try_into().unwrap();
    let project = Project::new(alice.id, "Garden", None);

    let mut inherited = Task::new(alice.id, "Water plants");
    inherited.project_id = Some(project.id);
    let mut overridden = Task::new(alice.id, "Prune roses");
    overridden.project_id = Some(project.id);
    let shared = Task::new(alice.id, "Buy seeds");
    let private = Task::new(alice.id, "Diary");

    let view = Capabilities::NONE;
    let editor = Capabilities::new(false, false, true, false);
    db.write(|tx| {
        ProjectStore::insert(tx, &project)?;
        for task in [&inherited, &overridden, &shared, &private] {
            TaskStore::insert(tx, task)?;
        }
        GrantStore::insert(tx, bob.id, Resource::Project(project.id), editor)?;
        GrantStore::insert(tx, bob.id, Resource::Task(overridden.id), view)?;
        GrantStore::insert(tx, bob.id, Resource::Task(shared.id), editor)
    })
    .unwrap();

    let visible = db.read(|tx| TaskStore::list_visible_to(tx, bob.id)).unwrap();
    let seen: Vec<(&str, Standing)> = visible
        .iter()
        .map(|v| (v.task.name.as_str(), v.standing))
        .collect();
    assert_eq!(
        seen,
        vec![
            (
                "Water plants",
                Standing::Inherited {
                    project: project.id,
                    capabilities: Capabilities::new(false, false, true, true),
                }
            ),
            ("Prune roses", Standing::direct(view)),
            ("Buy seeds", Standing::direct(editor)),
        ]
    );

    let authors = db.read(|tx| TaskStore::list_visible_to(tx, alice.id)).unwrap();
    assert_eq!(authors.len(), 4);
    assert!(authors
        .iter()
        .all(|v| v.standing == Standing::direct(Capabilities::FULL)));

    let nobody = db.read(|tx| TaskStore::list_visible_to(tx, carol.id)).unwrap();
    assert!(nobody.is_empty());
}

#[test]
fn task_views_carry_author_project_and_grant_time() {
    let db = Database::open_in_memory().unwrap();
    let [alice, bob]: [User; 2] = users(&db, &["alice", "bob"]).try_into().unwrap();
    let project = Project::new(alice.id, "Garden", None);
    let mut in_project = Task::new(alice.id, "Water plants");
    in_project.project_id = Some(project.id);
    let loose = Task::new(alice.id, "Buy seeds");
    let editor = Capabilities::new(false, false, true, false);

    let (task_grant, project_grant) = db
        .write(|tx| {
            ProjectStore::insert(tx, &project)?;
            TaskStore::insert(tx, &in_project)?;
            TaskStore::insert(tx, &loose)?;
            let task_grant = GrantStore::insert(tx, bob.id, Resource::Task(loose.id), editor)?;
            let project_grant =
                GrantStore::insert(tx, bob.id, Resource::Project(project.id), editor)?;
            Ok::<_, StoreError>((task_grant, project_grant))
        })
        .unwrap();

    let visible = db.read(|tx| TaskStore::list_visible_to(tx, bob.id)).unwrap();
    assert_eq!(visible.len(), 2);
    for view in &visible {
        assert_eq!(view.author_name, "alice");
        assert_eq!(view.author_email, "alice@example.com");
    }
    let inherited = visible.iter().find(|v| v.task.id == in_project.id).unwrap();
    assert_eq!(inherited.project_name.as_deref(), Some("Garden"));
    assert_eq!(inherited.granted_at, Some(project_grant.granted_at));
    let direct = visible.iter().find(|v| v.task.id == loose.id).unwrap();
    assert_eq!(direct.project_name, None);
    assert_eq!(direct.granted_at, Some(task_grant.granted_at));

    let single = db
        .read(|tx| TaskStore::view(tx, in_project.id, bob.id, inherited.standing))
        .unwrap()
        .unwrap();
    assert_eq!(&single, inherited);
    let missing = db
        .read(|tx| TaskStore::view(tx, TaskId::new(), bob.id, inherited.standing))
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn project_views_carry_author_and_grant_time() {
    let db = Database::open_in_memory().unwrap();
    let [alice, bob]: [User; 2] = users(&db, &["alice", "bob"]).try_into().unwrap();
    let project = Project::new(alice.id, "Garden", None);
    let editor = Capabilities::new(false, false, true, false);
    let grant = db
        .write(|tx| {
            ProjectStore::insert(tx, &project)?;
            GrantStore::insert(tx, bob.id, Resource::Project(project.id), editor)
        })
        .unwrap();

    let listed = db.read(|tx| ProjectStore::list_visible_to(tx, bob.id)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].author_name, "alice");
    assert_eq!(listed[0].author_email, "alice@example.com");
    assert_eq!(listed[0].granted_at, Some(grant.granted_at));

    let single = db
        .read(|tx| ProjectStore::view(tx, project.id, bob.id, editor))
        .unwrap()
        .unwrap();
    assert_eq!(single, listed[0]);

    // The author holds no grant row here.
    let authored = db
        .read(|tx| ProjectStore::view(tx, project.id, alice.id, Capabilities::FULL))
        .unwrap()
        .unwrap();
    assert_eq!(authored.granted_at, None);
    assert_eq!(authored.capabilities, Capabilities::FULL);
}

#[test]
fn task_update_missing_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    let alice = users(&db, &["alice"]).remove(0);
    let task = Task::new(alice.id, "Ghost");
    let err = db.write(|tx| TaskStore::update(tx, &task)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
