//! Status command

use anyhow::Result;
use savvy_core::Store;

use crate::output::Output;

pub fn show(store: &Store, output: &Output) -> Result<()> {
    if output.is_json() {
        let status = serde_json::json!({
            "configured": store.config().is_configured(),
            "signed_in": store.is_signed_in(),
            "user": store.session().map(|s| s.user.email.clone()),
            "links": store.link_count(),
            "categories": store.category_count(),
            "snapshot": store.has_snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    if store.config().is_configured() {
        output.message(&format!("Service:    {}", store.config().api_url));
    } else {
        output.message("Service:    not configured (run `savvy config set api_url ...`)");
    }
    match store.session() {
        Some(session) => output.message(&format!("Signed in:  {}", session.user.email)),
        None => output.message("Signed in:  no"),
    }
    output.message(&format!("Links:      {}", store.link_count()));
    output.message(&format!("Categories: {}", store.category_count()));
    output.message(&format!(
        "Snapshot:   {}",
        if store.has_snapshot() { "yes" } else { "none" }
    ));
    Ok(())
}
