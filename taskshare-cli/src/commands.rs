//! Maps parsed commands onto engine calls. Every command yields JSON.

use crate::cli::{
    Actor, CapabilityArgs, Command, ProjectCommand, TargetArgs, TaskCommand, UserCommand,
};
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use taskshare_access::{
    AccessEngine, AccessError, NewProject, NewTask, ProjectAssignment, ProjectChanges, TaskChanges,
};
use taskshare_types::{Identity, ProjectId, TargetUser, TaskId};

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn identity(engine: &AccessEngine, actor: &Actor) -> Result<Identity> {
    Ok(engine.identify(&TargetUser::Name(actor.acting_as.clone()))?)
}

fn task_id(raw: &str) -> Result<TaskId, AccessError> {
    Ok(TaskId::parse(raw).map_err(taskshare_types::Error::from)?)
}

fn project_id(raw: &str) -> Result<ProjectId, AccessError> {
    Ok(ProjectId::parse(raw).map_err(taskshare_types::Error::from)?)
}

fn target(target: &TargetArgs) -> Result<TargetUser, AccessError> {
    target.request(&CapabilityArgs::default()).target()
}

/// Runs one command against `engine`.
pub fn execute(engine: &AccessEngine, command: &Command) -> Result<Value> {
    match command {
        Command::User(cmd) => user(engine, cmd),
        Command::Project(cmd) => project(engine, cmd),
        Command::Task(cmd) => task(engine, cmd),
    }
}

fn user(engine: &AccessEngine, command: &UserCommand) -> Result<Value> {
    match command {
        UserCommand::Add { name, email } => to_json(&engine.register_user(name, email)?),
        UserCommand::Show { name } => to_json(&engine.find_user(&TargetUser::Name(name.clone()))?),
    }
}

fn project(engine: &AccessEngine, command: &ProjectCommand) -> Result<Value> {
    match command {
        ProjectCommand::Create {
            actor,
            name,
            description,
        } => {
            let me = identity(engine, actor)?;
            let fields = NewProject {
                name: name.clone(),
                description: description.clone(),
            };
            to_json(&engine.create_project(&me, fields)?)
        }
        ProjectCommand::List { actor } => {
            let me = identity(engine, actor)?;
            to_json(&engine.projects_visible_to(&me)?)
        }
        ProjectCommand::Show { actor, id } => {
            let me = identity(engine, actor)?;
            to_json(&engine.get_project(&me, project_id(id)?)?)
        }
        ProjectCommand::Edit {
            actor,
            id,
            name,
            description,
            completed,
        } => {
            let me = identity(engine, actor)?;
            let changes = ProjectChanges {
                name: name.clone(),
                description: description.clone().map(Some),
                completed: *completed,
            };
            to_json(&engine.edit_project(&me, project_id(id)?, changes)?)
        }
        ProjectCommand::Delete { actor, id } => {
            let me = identity(engine, actor)?;
            let id = project_id(id)?;
            engine.delete_project(&me, id)?;
            Ok(json!({ "deleted": id }))
        }
        ProjectCommand::Share {
            actor,
            id,
            target,
            capabilities,
        } => {
            let me = identity(engine, actor)?;
            let request = target.request(capabilities);
            to_json(&engine.grant_project_access(&me, project_id(id)?, &request)?)
        }
        ProjectCommand::Access { actor, id } => {
            let me = identity(engine, actor)?;
            to_json(&engine.project_accessors(&me, project_id(id)?)?)
        }
        ProjectCommand::EditAccess {
            actor,
            id,
            target,
            capabilities,
        } => {
            let me = identity(engine, actor)?;
            let request = target.request(capabilities);
            to_json(&engine.edit_project_access(&me, project_id(id)?, &request)?)
        }
        ProjectCommand::Revoke {
            actor,
            id,
            target: who,
        } => {
            let me = identity(engine, actor)?;
            let id = project_id(id)?;
            let who = target(who)?;
            engine.revoke_project_access(&me, id, &who)?;
            Ok(json!({ "revoked": who.to_string(), "project": id }))
        }
    }
}

fn task(engine: &AccessEngine, command: &TaskCommand) -> Result<Value> {
    match command {
        TaskCommand::Create {
            actor,
            name,
            description,
            project,
            due,
            start,
            end,
        } => {
            let me = identity(engine, actor)?;
            let fields = NewTask {
                name: name.clone(),
                description: description.clone(),
                project_id: project.as_deref().map(project_id).transpose()?,
                date_to_complete: *due,
                start_time: *start,
                end_time: *end,
            };
            to_json(&engine.create_task(&me, fields)?)
        }
        TaskCommand::List { actor } => {
            let me = identity(engine, actor)?;
            to_json(&engine.tasks_visible_to(&me)?)
        }
        TaskCommand::Show { actor, id } => {
            let me = identity(engine, actor)?;
            to_json(&engine.get_task(&me, task_id(id)?)?)
        }
        TaskCommand::Edit {
            actor,
            id,
            name,
            description,
            completed,
            due,
            project,
            detach,
        } => {
            let me = identity(engine, actor)?;
            let assignment = match (project, detach) {
                (Some(project), _) => ProjectAssignment::Assign(project_id(project)?),
                (None, true) => ProjectAssignment::Detach,
                (None, false) => ProjectAssignment::Unchanged,
            };
            let changes = TaskChanges {
                name: name.clone(),
                description: description.clone().map(Some),
                completed: *completed,
                date_to_complete: due.map(Some),
                project: assignment,
                ..TaskChanges::default()
            };
            to_json(&engine.edit_task(&me, task_id(id)?, changes)?)
        }
        TaskCommand::Delete { actor, id } => {
            let me = identity(engine, actor)?;
            let id = task_id(id)?;
            engine.delete_task(&me, id)?;
            Ok(json!({ "deleted": id }))
        }
        TaskCommand::Share {
            actor,
            id,
            target,
            capabilities,
        } => {
            let me = identity(engine, actor)?;
            let request = target.request(capabilities);
            to_json(&engine.grant_task_access(&me, task_id(id)?, &request)?)
        }
        TaskCommand::Access { actor, id } => {
            let me = identity(engine, actor)?;
            to_json(&engine.task_accessors(&me, task_id(id)?)?)
        }
        TaskCommand::EditAccess {
            actor,
            id,
            target,
            capabilities,
        } => {
            let me = identity(engine, actor)?;
            let request = target.request(capabilities);
            to_json(&engine.edit_task_access(&me, task_id(id)?, &request)?)
        }
        TaskCommand::Revoke {
            actor,
            id,
            target: who,
        } => {
            let me = identity(engine, actor)?;
            let id = task_id(id)?;
            let who = target(who)?;
            engine.revoke_task_access(&me, id, &who)?;
            Ok(json!({ "revoked": who.to_string(), "task": id }))
        }
    }
}
