use crate::cli::{
    Command, ContactCommand, SubtaskCommand, TaskCommand, TaskEditArgs, TaskFieldArgs,
};
use std::error::Error;
use taskboard_core::{
    clear_session, format_due_date, summarize, AccountService, AppConfig, Board, BoardService,
    Contact, ContactFields, ContactService, HttpRemoteStore, IdentityService,
    RemoteBoardRepository, RemoteContactRepository, RemoteUserRepository, SessionCache,
    SessionContext, SqliteSessionCache, Task, TaskDraft, TaskFields, TaskStatus, UserPaths,
};

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

type Boards<'s> = BoardService<RemoteBoardRepository<'s, HttpRemoteStore>>;
type Contacts<'s> = ContactService<RemoteContactRepository<'s, HttpRemoteStore>>;

pub fn run(command: Command, config: &AppConfig, cache: &SqliteSessionCache<'_>) -> CliResult {
    if let Command::Logout = command {
        clear_session(cache)?;
        println!("Signed out.");
        return Ok(());
    }

    let store = HttpRemoteStore::new(config.require_store_url()?, config.timeout())?;
    let identity = IdentityService::new(RemoteUserRepository::new(&store), cache);
    let accounts = AccountService::new(RemoteUserRepository::new(&store));

    match command {
        Command::Logout => Ok(()),
        Command::Register {
            name,
            email,
            password,
        } => {
            let signed = accounts.register(&name, &email, &password)?;
            println!(
                "Registered {}. Sign in with `taskboard login --email {}`.",
                signed.user.name, signed.user.email
            );
            Ok(())
        }
        Command::Login {
            email,
            password,
            guest,
        } => {
            let signed = if guest {
                accounts.ensure_guest_user()?;
                accounts.sign_in_guest()?
            } else {
                let email = email.ok_or("--email is required")?;
                let password = password.ok_or("--password is required")?;
                accounts.sign_in(&email, &password)?
            };
            identity.begin_session(&signed.context, &signed.user)?;
            println!("Signed in as {}.", signed.user.name);
            Ok(())
        }
        Command::Whoami => {
            match identity.resolve_active_user()? {
                Some(user) => println!(
                    "{} <{}>: {} contacts, {} tasks",
                    user.name,
                    user.email,
                    user.contacts.len(),
                    user.board.len()
                ),
                None => println!("Not signed in."),
            }
            Ok(())
        }
        Command::Board => {
            let ctx = require_session(&identity)?;
            print_board(load_board(&store, &ctx)?.board());
            Ok(())
        }
        Command::Summary => {
            let ctx = require_session(&identity)?;
            let summary = summarize(load_board(&store, &ctx)?.board());
            println!("To do:          {}", summary.todo);
            println!("In progress:    {}", summary.in_progress);
            println!("Await feedback: {}", summary.await_feedback);
            println!("Done:           {}", summary.done);
            println!("Tasks on board: {}", summary.total);
            println!("Urgent:         {}", summary.urgent);
            match summary.next_urgent_deadline {
                Some(date) => println!("Next deadline:  {}", format_due_date(date)),
                None => println!("Next deadline:  none"),
            }
            Ok(())
        }
        Command::Search { term } => {
            let ctx = require_session(&identity)?;
            print_board(&load_board(&store, &ctx)?.search(&term));
            Ok(())
        }
        Command::Task { task_cmd } => {
            let ctx = require_session(&identity)?;
            run_task(task_cmd, &store, &ctx)
        }
        Command::Subtask { subtask_cmd } => {
            let ctx = require_session(&identity)?;
            run_subtask(subtask_cmd, &mut load_board(&store, &ctx)?)
        }
        Command::Contact { contact_cmd } => {
            let ctx = require_session(&identity)?;
            run_contact(contact_cmd, &store, &ctx)
        }
    }
}

fn run_task(command: TaskCommand, store: &HttpRemoteStore, ctx: &SessionContext) -> CliResult {
    let mut board = load_board(store, ctx)?;
    match command {
        TaskCommand::Add {
            fields,
            status,
            subtasks,
        } => {
            let contacts = load_contacts(store, ctx)?;
            let draft = TaskDraft::new(new_fields(fields, &contacts)?).with_subtasks(subtasks);
            let task = board.create_task(draft, status)?;
            println!("Created task {} in {}.", task.id, status.label());
        }
        TaskCommand::Edit { id, fields } => {
            let found = board.find_task(&id).map(|found| found.task.clone());
            let Some(current) = found else {
                println!("No task with id {id}.");
                return Ok(());
            };
            let contacts = load_contacts(store, ctx)?;
            let status = current.status;
            board.edit_task(&id, status, edited_fields(current, fields, &contacts)?)?;
            println!("Updated task {id}.");
        }
        TaskCommand::Move { id, to } => {
            let Some(from) = board.find_task(&id).map(|found| found.location.status) else {
                println!("No task with id {id}.");
                return Ok(());
            };
            board.move_task(&id, from, to)?;
            println!("Moved task {id} from {} to {}.", from.label(), to.label());
        }
        TaskCommand::Delete { id } => {
            let Some(status) = board.find_task(&id).map(|found| found.location.status) else {
                println!("No task with id {id}.");
                return Ok(());
            };
            board.delete_task(&id, status)?;
            println!("Deleted task {id}.");
        }
    }
    Ok(())
}

fn run_subtask(command: SubtaskCommand, board: &mut Boards<'_>) -> CliResult {
    let changed = match command {
        SubtaskCommand::Add { task_id, text } => board.add_subtask(&task_id, &text)?,
        SubtaskCommand::Edit {
            task_id,
            index,
            text,
        } => board.edit_subtask(&task_id, index, &text)?,
        SubtaskCommand::Delete { task_id, index } => board.delete_subtask(&task_id, index)?,
        SubtaskCommand::Toggle { task_id, index } => {
            board.toggle_subtask_completed(&task_id, index)?
        }
    };
    if changed {
        println!("Subtasks updated.");
    } else {
        println!("Nothing changed: unknown task id or subtask index.");
    }
    Ok(())
}

fn run_contact(
    command: ContactCommand,
    store: &HttpRemoteStore,
    ctx: &SessionContext,
) -> CliResult {
    let mut contacts = load_contact_service(store, ctx)?;
    match command {
        ContactCommand::List => {
            for group in contacts.groups() {
                println!("{}", group.letter);
                for contact in group.contacts {
                    println!(
                        "  {}  {} [{}]  {}  {}",
                        contact.id, contact.name, contact.initials, contact.email, contact.number
                    );
                }
            }
        }
        ContactCommand::Add { name, email, phone } => {
            let contact = contacts.create_contact(ContactFields::new(name, email, phone))?;
            println!("Created contact {}.", contact.id);
        }
        ContactCommand::Edit {
            id,
            name,
            email,
            phone,
        } => {
            let Some(current) = contacts.get(&id).cloned() else {
                println!("No contact with id {id}.");
                return Ok(());
            };
            let fields = ContactFields::new(
                name.unwrap_or(current.name),
                email.unwrap_or(current.email),
                phone.unwrap_or(current.number),
            );
            let mut board = load_board(store, ctx)?;
            contacts.edit_contact(&id, fields, &mut board)?;
            println!("Updated contact {id}.");
        }
        ContactCommand::Delete { id } => {
            let mut board = load_board(store, ctx)?;
            match contacts.delete_contact(&id, &mut board)? {
                Some(_) => println!("Deleted contact {id}."),
                None => println!("No contact with id {id}."),
            }
        }
    }
    Ok(())
}

fn require_session<C: SessionCache>(
    identity: &IdentityService<RemoteUserRepository<'_, HttpRemoteStore>, C>,
) -> CliResult<SessionContext> {
    Ok(identity
        .active_context()?
        .ok_or("not signed in; run `taskboard login` first")?)
}

fn load_board<'s>(store: &'s HttpRemoteStore, ctx: &SessionContext) -> CliResult<Boards<'s>> {
    let repo = RemoteBoardRepository::new(store, UserPaths::new(ctx));
    Ok(BoardService::load(repo)?)
}

fn load_contact_service<'s>(
    store: &'s HttpRemoteStore,
    ctx: &SessionContext,
) -> CliResult<Contacts<'s>> {
    let repo = RemoteContactRepository::new(store, UserPaths::new(ctx));
    Ok(ContactService::load(repo)?)
}

fn load_contacts(store: &HttpRemoteStore, ctx: &SessionContext) -> CliResult<Vec<Contact>> {
    Ok(load_contact_service(store, ctx)?.contacts().to_vec())
}

fn resolve_contacts(ids: &[String], registry: &[Contact]) -> CliResult<Vec<Contact>> {
    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        let contact = registry
            .iter()
            .find(|contact| &contact.id == id)
            .ok_or_else(|| format!("unknown contact id `{id}`"))?;
        resolved.push(contact.clone());
    }
    Ok(resolved)
}

fn new_fields(args: TaskFieldArgs, registry: &[Contact]) -> CliResult<TaskFields> {
    Ok(TaskFields {
        title: args.title,
        description: args.description,
        due_date: args.due,
        priority: args.priority,
        category: args.category,
        contacts: resolve_contacts(&args.contacts, registry)?,
    })
}

fn edited_fields(
    current: Task,
    args: TaskEditArgs,
    registry: &[Contact],
) -> CliResult<TaskFields> {
    let contacts = match args.contacts {
        Some(ids) => resolve_contacts(&ids, registry)?,
        None => current.contacts,
    };
    Ok(TaskFields {
        title: args.title.unwrap_or(current.title),
        description: args.description.unwrap_or(current.description),
        due_date: args.due.unwrap_or(current.due_date),
        priority: args.priority.unwrap_or(current.priority),
        category: Some(args.category.unwrap_or(current.category)),
        contacts,
    })
}

fn print_board(board: &Board) {
    for status in TaskStatus::ALL {
        let tasks = board.tasks(status);
        println!("{} ({})", status.label(), tasks.len());
        for task in tasks {
            let progress = task.progress();
            let subtasks = if progress.total > 0 {
                format!("  {}/{} subtasks", progress.completed, progress.total)
            } else {
                String::new()
            };
            println!(
                "  {}  {}  [{}, {}]  due {}{}",
                task.id,
                task.title,
                task.category.label(),
                task.priority.as_str(),
                task.due_date,
                subtasks
            );
            for (index, subtask) in task.subtasks.iter().enumerate() {
                let mark = if subtask.completed { 'x' } else { ' ' };
                println!("      {index}. [{mark}] {}", subtask.text);
            }
        }
    }
}
