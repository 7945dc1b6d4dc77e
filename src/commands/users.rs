//! User listing, export and role management.

use super::{CmdResult, ExportArgs, TableArgs, api_failure};
use crate::api::AdminApi;
use crate::cli_messages::{print_page_footer, print_table};
use crate::export::{self, Exportable};
use crate::models::{Role, User, UserDirectory};
use crate::{print_cmd_error, print_cmd_success};
use crate::session::Session;
use crate::table::sort_by_role;
use tokio_util::sync::CancellationToken;

async fn fetch_sorted(api: &dyn AdminApi, cancel: &CancellationToken) -> CmdResult<Vec<User>> {
    let mut users = crate::fetch::cancellable(cancel, api.list_users())
        .await
        .map_err(|e| api_failure("Failed to fetch users.", e))?;
    sort_by_role(&mut users);
    Ok(users)
}

/// Prints one page of users, super-admins first.
pub async fn list(
    api: &dyn AdminApi,
    args: &TableArgs,
    role: Option<Role>,
    default_page_size: usize,
    cancel: &CancellationToken,
) -> CmdResult {
    let users = fetch_sorted(api, cancel).await?;
    let view = args.view(default_page_size, role.map(|r| r.key().to_string()));
    let page = view.page(&users);

    let directory = UserDirectory::default();
    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|user| {
            let mut row = vec![user.id.clone()];
            row.extend(user.row(&directory));
            row
        })
        .collect();
    print_table(&["ID", "Name", "Email", "Phone", "Role"], &rows);
    print_page_footer(page.page, page.total_pages, page.total_matches);
    Ok(())
}

/// Writes every user matching the filters to a CSV or XLSX file.
pub async fn export(
    api: &dyn AdminApi,
    args: &ExportArgs,
    role: Option<Role>,
    cancel: &CancellationToken,
) -> CmdResult<usize> {
    let users = fetch_sorted(api, cancel).await?;
    let view = args.view(role.map(|r| r.key().to_string()));
    let rows = view.filter(&users);
    let directory = UserDirectory::new(&users);
    let written =
        export::export(&rows, &directory, &args.output, args.format).map_err(|e| {
            print_cmd_error!("Export failed.", &e.to_string());
            e
        })?;
    print_cmd_success!(
        "Export complete.",
        "{} users written to {}",
        written,
        args.output.display()
    );
    Ok(written)
}

/// Changes a user's role. Only super-admins may do this.
pub async fn set_role(
    api: &dyn AdminApi,
    session: &Session,
    user_id: &str,
    role: Role,
) -> CmdResult {
    if let Err(e) = session.require_super_admin() {
        print_cmd_error!(&e.to_string());
        return Err(e.into());
    }

    api.update_user_role(user_id, role)
        .await
        .map_err(|e| api_failure("Failed to update user role.", e))?;
    print_cmd_success!(
        "User role updated successfully!",
        "User {} is now {}",
        user_id,
        role
    );
    Ok(())
}
