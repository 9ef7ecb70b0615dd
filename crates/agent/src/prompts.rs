//! Prompt text for the planner, executor, and replanner.
//!
//! Wording lives here and nowhere else; the control flow only decides
//! which pieces of session state get rendered into which prompt.

use planexec_core::state::{PastStep, SessionState, TimeContext};

/// Opening line of the delimited draft block in a task input.
pub const DRAFT_BEGIN: &str = "=== CURRENT DRAFT BEGIN ===";
/// Closing line of the delimited draft block in a task input.
pub const DRAFT_END: &str = "=== CURRENT DRAFT END ===";

/// Shown to a document task when no draft exists yet.
pub const NO_DRAFT_NOTE: &str =
    "(No draft exists yet. If this task asks for a document, write the initial draft in full.)";

const PLANNER_POLICY: &str = "\
You are the planner of a plan-and-execute assistant. Break the user's objective \
into the shortest list of concrete tasks an executor can carry out one at a time.

The executor can:
- call `web_search` to look things up on the internet;
- write and rework text. Any document the objective asks for is kept as a single \
evolving draft that the executor sees whenever a task mentions it.

Rules for the plan:
1. Any task that needs information from the internet must say explicitly to use \
`web_search` and what to search for.
2. For documents, the first document task must say \"Generate an initial draft of ...\". \
Later document tasks must say they work on the current draft, for example \
\"Refine the current draft for ...\" or \"Add a section on ... to the current draft\".
3. Match the number of tasks to the objective. A simple question or a single lookup \
needs one or two tasks.
4. Each task is one actionable instruction. Merge steps that belong together and \
leave out anything that does not move the objective forward.
5. The output of the last task must be the final answer or the finished document.
6. Use the time context below for anything time-sensitive: name the period you \
mean when historical data is needed, and treat the current time as the reference \
point for anything about the future.";

const REPLANNER_POLICY: &str = "\
You are the replanner of a plan-and-execute assistant. Read the objective, the \
tasks executed so far with their outcomes, the current draft, and the tasks that \
were still planned. Then either finish with a final response or return the tasks \
that remain.

Rules:
1. Outcomes are plain text. If an outcome says the executor could not do a task \
or hit an error, never plan that same task again. Try a different route: split \
it up, search for what was missing with `web_search`, or generate the draft first \
if the task needed a draft that does not exist yet.
2. If the objective needs a document and the draft is empty or too thin, the next \
task is to generate (or regenerate) the draft from what earlier tasks found.
3. If a draft exists, every further document task must say it works on the \
current draft.
4. Only search again when specific information is still missing, and search for \
exactly that.
5. The returned plan holds only work that is still to be done, sized to what is \
left. Often that is a single task.
6. When the objective is fully met, answer with a response. If the objective was \
a document, the response is the finished draft text; otherwise it is the direct \
answer.
7. If the same kind of task keeps failing, change approach or narrow the goal \
instead of repeating it.
8. Use the time context below for anything time-sensitive, including tasks that \
failed because of dates.";

/// System prompt for the planner.
pub fn planner_system(time: &TimeContext) -> String {
    format!("{PLANNER_POLICY}\n\n{}", time_block(time))
}

/// System prompt for the executor's tool-using agent.
pub fn executor_system(time_context: &str) -> String {
    format!(
        "You are a careful ReAct agent. Carry out exactly one task using the tools \
available to you, then reply with the result of that task.

Tools:
- web_search: searches the internet. Judge how recent a result is against the \
current time: {time_context}

How to work:
1. Read the task closely before acting.
2. For search tasks, call web_search and reply with a concise factual summary of \
what you found.
3. For writing tasks, reply with the document text itself. When the input contains \
a block between \"{DRAFT_BEGIN}\" and \"{DRAFT_END}\", you MUST apply the task \
(review, refine, extend, summarise) to exactly that text and reply with the \
complete new version.
4. If the task cannot be done with these tools or this information, say plainly \
what is missing instead of guessing. You cannot open files or visit systems \
other than through the tools listed above.
5. Work only on this task, not on the rest of the plan."
    )
}

/// The user turn sent to the executor's agent for one task.
pub fn task_input(task: &str, document_task: bool, draft: Option<&str>) -> String {
    match (document_task, draft) {
        (true, Some(draft)) => format!(
            "Task: {task}\n\nYou MUST work on the existing draft below, verbatim as given:\n\
             {DRAFT_BEGIN}\n{draft}\n{DRAFT_END}\n"
        ),
        (true, None) => format!("Task: {task}\n{NO_DRAFT_NOTE}\n"),
        (false, _) => task.to_string(),
    }
}

/// System prompt for the replanner.
pub fn replanner_system(time: &TimeContext) -> String {
    format!("{REPLANNER_POLICY}\n\n{}", time_block(time))
}

/// The user turn for the replanner: everything the session knows.
pub fn replanner_input(state: &SessionState) -> String {
    let plan = if state.plan.is_empty() {
        "(no tasks left)".to_string()
    } else {
        numbered(state.plan.iter().map(String::as_str))
    };

    let draft = state
        .draft
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or("(empty)");

    format!(
        "# Objective\n{objective}\n\n\
         # Tasks still planned\n{plan}\n\n\
         # Executed tasks and outcomes\n{history}\n\n\
         # Current draft\n{draft}\n",
        objective = state.objective(),
        history = render_history(&state.past_steps),
    )
}

fn render_history(steps: &[PastStep]) -> String {
    if steps.is_empty() {
        return "(nothing executed yet)".into();
    }
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. Task: {}\n   Outcome: {}", i + 1, step.task, step.outcome))
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn time_block(time: &TimeContext) -> String {
    format!(
        "Current UTC date: {}\nCurrent UTC time: {}\nCurrent year: {}",
        time.date, time.time, time.year
    )
}
