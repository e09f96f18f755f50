use chrono::{DateTime, Utc};
use comfy_table::Table;
use rollcall_client::{ClientPage, ClientRecord, TaskPage, TaskStatus};

fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn page_line(page: u32, total_pages: u64, total: u64) -> String {
    format!("page {}/{} ({} total)", page, total_pages.max(1), total)
}

pub(crate) fn clients_table(page: &ClientPage) -> String {
    let mut table = Table::new();

    table.set_header(vec![
        "id",
        "client id",
        "ip address",
        "status",
        "work",
        "last heartbeat",
    ]);

    for rec in &page.items {
        table.add_row(vec![
            rec.id.to_string(),
            rec.client_id.clone(),
            rec.ip_address.clone(),
            rec.status.to_string(),
            rec.task_status.to_string(),
            format_time(&rec.last_heartbeat),
        ]);
    }

    format!(
        "{}\n{}",
        table,
        page_line(page.page, page.total_pages, page.total)
    )
}

pub(crate) fn client_details(rec: &ClientRecord) -> String {
    let mut table = Table::new();

    table
        .add_row(vec!["id", rec.id.to_string().as_str()])
        .add_row(vec!["client id", rec.client_id.as_str()])
        .add_row(vec!["ip address", rec.ip_address.as_str()])
        .add_row(vec!["status", rec.status.to_string().as_str()])
        .add_row(vec!["work", rec.task_status.to_string().as_str()])
        .add_row(vec![
            "last heartbeat",
            format_time(&rec.last_heartbeat).as_str(),
        ])
        .add_row(vec!["created at", format_time(&rec.created_at).as_str()]);

    table.to_string()
}

pub(crate) fn tasks_table(page: &TaskPage) -> String {
    let mut table = Table::new();

    table.set_header(vec![
        "id",
        "target",
        "status",
        "progress",
        "clients",
        "open slices",
        "created",
    ]);

    for task in &page.items {
        let open = task
            .assignments
            .iter()
            .filter(|a| matches!(a.status, TaskStatus::Pending | TaskStatus::Running))
            .count();

        table.add_row(vec![
            task.id.to_string(),
            task.target.clone(),
            task.status.to_string(),
            format!("{:.1}%", task.progress),
            task.client_count.to_string(),
            open.to_string(),
            format_time(&task.created_at),
        ]);
    }

    format!(
        "{}\n{}",
        table,
        page_line(page.page, page.total_pages, page.total)
    )
}
