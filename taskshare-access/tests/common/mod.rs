#![allow(dead_code)]

use taskshare_access::{AccessEngine, NewProject, NewTask, ShareRequest};
use taskshare_store::{Database, Project, Task};
use taskshare_types::{Capabilities, Identity, ProjectId, TargetUser};

pub const EDITOR: Capabilities = Capabilities::new(false, false, true, false);
pub const SHARER: Capabilities = Capabilities::new(true, false, false, false);
pub const MANAGER: Capabilities = Capabilities::new(true, true, false, false);

pub struct World {
    pub db: Database,
    pub engine: AccessEngine,
    pub alice: Identity,
    pub bob: Identity,
    pub carol: Identity,
}

pub fn world() -> World {
    let db = Database::open_in_memory().unwrap();
    let engine = AccessEngine::new(db.clone());
    let alice = engine
        .register_user("alice", "alice@example.com")
        .unwrap()
        .identity();
    let bob = engine
        .register_user("bob", "bob@example.com")
        .unwrap()
        .identity();
    let carol = engine
        .register_user("carol", "carol@example.com")
        .unwrap()
        .identity();
    World {
        db,
        engine,
        alice,
        bob,
        carol,
    }
}

pub fn share_with(user: &Identity, caps: Capabilities) -> ShareRequest {
    ShareRequest::to(TargetUser::Id(user.id)).with_capabilities(caps)
}

impl World {
    pub fn project(&self, author: &Identity, name: &str) -> Project {
        self.engine
            .create_project(
                author,
                NewProject {
                    name: name.to_string(),
                    description: None,
                },
            )
            .unwrap()
            .project
    }

    pub fn task(&self, author: &Identity, name: &str, project: Option<ProjectId>) -> Task {
        let mut fields = NewTask::named(name);
        fields.project_id = project;
        self.engine.create_task(author, fields).unwrap().task
    }
}
