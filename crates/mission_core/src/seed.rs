//! Initial board and memory log contents.
//!
//! All rows of one seeding call share the same `now_ms`, so their relative
//! order comes from insertion order alone.

use crate::model::memory::{Memory, MemoryCategory};
use crate::model::task::{Assignee, Task, TaskPriority};
use crate::repo::memory_repo::MemoryRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoResult;

struct SeedTask {
    title: &'static str,
    description: &'static str,
    assigned_to: Assignee,
    priority: TaskPriority,
}

struct SeedMemory {
    content: &'static str,
    category: MemoryCategory,
    source: &'static str,
}

const INITIAL_TASKS: &[SeedTask] = &[
    SeedTask {
        title: "Update LinkedIn headline",
        description: "Change to: 'LinkedIn Content for B2B Consultants | Turning Expertise into Inbound Leads'",
        assigned_to: Assignee::Cristina,
        priority: TaskPriority::High,
    },
    SeedTask {
        title: "Request testimonial from existing client",
        description: "Ask current client for a LinkedIn recommendation or written testimonial",
        assigned_to: Assignee::Cristina,
        priority: TaskPriority::High,
    },
    SeedTask {
        title: "Draft offer post for LinkedIn content services",
        description: "Create a compelling LinkedIn post offering content services to B2B consultants",
        assigned_to: Assignee::Cristina,
        priority: TaskPriority::High,
    },
    SeedTask {
        title: "Send first pitch to prospect",
        description: "Reach out to first potential LinkedIn content client",
        assigned_to: Assignee::Cristina,
        priority: TaskPriority::High,
    },
    SeedTask {
        title: "Review LinkedIn profile revamp sections",
        description: "Review the full profile revamp Jesus drafted and pick 1-2 sections to update",
        assigned_to: Assignee::Cristina,
        priority: TaskPriority::Medium,
    },
    SeedTask {
        title: "Set up lead tracking system",
        description: "Create system to track and nurture leads for Think Lean consulting",
        assigned_to: Assignee::Jesus,
        priority: TaskPriority::High,
    },
    SeedTask {
        title: "Install useful ClawHub skills",
        description: "Research and install helpful skills from clawhub.com",
        assigned_to: Assignee::Jesus,
        priority: TaskPriority::Medium,
    },
    SeedTask {
        title: "Set up 3 core cron jobs",
        description: "Configure scheduled reminders for accountability and monitoring",
        assigned_to: Assignee::Jesus,
        priority: TaskPriority::Medium,
    },
    SeedTask {
        title: "Tournament at WSA - Saturday prep",
        description: "Tournament this Saturday at 8:00 AM - prepare schedule",
        assigned_to: Assignee::Cristina,
        priority: TaskPriority::Medium,
    },
];

const INITIAL_MEMORIES: &[SeedMemory] = &[
    SeedMemory {
        content: "Cristina has a tournament at WSA on Saturday, February 21, 2026 at 8:00 AM",
        category: MemoryCategory::Personal,
        source: "conversation 2026-02-18",
    },
    SeedMemory {
        content: "Mission Control dashboard deployed to Vercel on February 19, 2026",
        category: MemoryCategory::Work,
        source: "deployment",
    },
    SeedMemory {
        content: "Primary goal: Land first LinkedIn content client for Think Lean",
        category: MemoryCategory::Goal,
        source: "HEARTBEAT.md",
    },
    SeedMemory {
        content: "Current client count: 2 active clients",
        category: MemoryCategory::Work,
        source: "MEMORY.md",
    },
    SeedMemory {
        content: "Cristina is extremely forgetful and requires external memory and push to stay on track",
        category: MemoryCategory::Preference,
        source: "USER.md",
    },
];

/// Inserts every initial task as `Todo` and returns how many were written.
pub fn seed_tasks(repo: &impl TaskRepository, now_ms: i64) -> RepoResult<usize> {
    for seed in INITIAL_TASKS {
        let mut task = Task::new(seed.title, seed.assigned_to, seed.priority, now_ms);
        task.description = Some(seed.description.to_string());
        repo.insert_task(&task)?;
    }
    Ok(INITIAL_TASKS.len())
}

/// Inserts every initial memory and returns how many were written.
pub fn seed_memories(repo: &impl MemoryRepository, now_ms: i64) -> RepoResult<usize> {
    for seed in INITIAL_MEMORIES {
        let mut memory = Memory::new(seed.content, seed.category, now_ms);
        memory.source = Some(seed.source.to_string());
        repo.insert_memory(&memory)?;
    }
    Ok(INITIAL_MEMORIES.len())
}
