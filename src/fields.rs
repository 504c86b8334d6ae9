use crate::accounts::ReferenceTables;
use crate::schema::{AccrualFlag, EntityKind, ProductCodeCheck, RecordCore};

/// Fills the financial output fields of one record. Runs only where the
/// accrual flag is `Y`; on every other record the outputs are left untouched.
/// The booked product code is written at most once across reruns.
pub fn derive_core(
    core: &mut RecordCore,
    accrual_amount: f64,
    entity: EntityKind,
    refs: &ReferenceTables,
    fixed_assets: &[String],
) {
    if core.accrual != Some(AccrualFlag::Yes) {
        return;
    }

    let code = core.gl_account.clone();
    core.account_code = Some(code.clone());

    if fixed_assets.iter().any(|account| *account == code) {
        core.fixed_asset = Some(AccrualFlag::Yes);
    }

    core.account_name = refs.account_name(&code).map(str::to_string);
    core.liability_account = refs.liability(&code).map(str::to_string);
    core.region_code = Some(region_code(&code, &core.region));
    core.department_code = Some(department_code(entity, &code, &core.department));
    core.accrual_currency = Some(core.currency.clone());
    core.accrual_amount = Some(accrual_amount);

    if core.booked_product_code.is_none() {
        core.booked_product_code = Some(core.product_code.clone());
    }

    core.product_code_check = Some(product_code_check(
        core.project.as_deref(),
        &core.product_code,
    ));
}

/// Income and expense accounts (leading digit 4-6) keep the source region;
/// everything else books to the neutral region.
pub fn region_code(account_code: &str, region: &str) -> String {
    match account_code.chars().next() {
        Some('4'..='6') => region.to_string(),
        _ => "000".to_string(),
    }
}

/// Department code per entity category. SPT dispatches on the account code's
/// leading digit; the digit-4/5 branch outranks department truncation.
pub fn department_code(entity: EntityKind, account_code: &str, department: &str) -> String {
    match entity {
        EntityKind::Mob => truncate_department(department),
        EntityKind::Spt => {
            let first = account_code.chars().next().unwrap_or('\0');
            if matches!(first, '4' | '5') {
                "000".to_string()
            } else if matches!(first, '1' | '2' | '9') {
                "000".to_string()
            } else {
                truncate_department(department)
            }
        }
    }
}

fn truncate_department(department: &str) -> String {
    department.chars().take(3).collect()
}

/// Compares the project's leading alphanumeric token against the product
/// code.
pub fn product_code_check(project: Option<&str>, product_code: &str) -> ProductCodeCheck {
    let token: String = project
        .unwrap_or("")
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if token == product_code {
        ProductCodeCheck::Good
    } else {
        ProductCodeCheck::Bad
    }
}
