//! `riskreg prevention` and `riskreg mitigation` commands - Save a response plan

use console::style;
use miette::Result;

use crate::cli::helpers::{open_workbook, report_success, report_warning, resolve_id};
use crate::cli::GlobalOpts;
use crate::core::quantity::{format_amount, format_rank, Percent};
use crate::core::{Config, EditOutcome, MitigationInput, PreventionInput};

#[derive(clap::Args, Debug)]
pub struct PreventionArgs {
    /// Risk ID, unique ID prefix, or @N
    pub id: String,

    /// Preventive (or facilitating) action
    #[arg(long, default_value = "")]
    pub action: String,

    /// Cost of the response
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub cost: f64,

    /// Probability after the action, in percent (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub new_probability: Option<u8>,

    /// Impact after the action
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub new_impact: f64,
}

#[derive(clap::Args, Debug)]
pub struct MitigationArgs {
    /// Risk ID, unique ID prefix, or @N
    pub id: String,

    /// Mitigating (or exploiting) action
    #[arg(long, default_value = "")]
    pub action: String,

    /// Cost of the action
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub cost: f64,

    /// When to follow up
    #[arg(long, default_value = "")]
    pub follow_up: String,

    #[arg(long, default_value = "")]
    pub follow_up_owner: String,

    #[arg(long, default_value = "")]
    pub action_owner: String,

    /// Condition that triggers the action
    #[arg(long, default_value = "")]
    pub trigger: String,
}

pub fn run_prevention(args: PreventionArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let id = resolve_id(workbook.store(), &args.id)?;

    let plan = PreventionInput {
        action: args.action,
        response_cost: args.cost,
        new_probability: args.new_probability.map(|p| Percent::new(f64::from(p))),
        new_impact: args.new_impact,
    };

    if workbook.store_mut().apply_prevention_plan(&id, plan) == EditOutcome::NotFound {
        return Err(miette::miette!("Risk not found: {}", id));
    }
    workbook.save()?;

    if let Some(risk) = workbook.store().get(&id) {
        report_success(
            global,
            format!(
                "Saved prevention plan for {} (new expected value {}, new priority {})",
                style(id).cyan(),
                format_amount(risk.prevention.new_expected_value),
                format_rank(risk.prevention.new_priority)
            ),
        );
    }
    Ok(())
}

pub fn run_mitigation(args: MitigationArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let id = resolve_id(workbook.store(), &args.id)?;

    let plan = MitigationInput {
        action: args.action,
        cost: args.cost,
        follow_up: args.follow_up,
        follow_up_owner: args.follow_up_owner,
        action_owner: args.action_owner,
        trigger: args.trigger,
    };

    if workbook.store_mut().apply_mitigation_plan(&id, plan) == EditOutcome::NotFound {
        return Err(miette::miette!("Risk not found: {}", id));
    }
    workbook.save()?;

    let Some(risk) = workbook.store().get(&id) else {
        return Err(miette::miette!("Risk not found: {}", id));
    };
    if risk.prevention.new_probability.is_none() {
        report_warning(format!(
            "{} has no new probability yet; the expected mitigation cost is 0 until {} is saved",
            id,
            style("riskreg prevention").yellow()
        ));
    }

    report_success(
        global,
        format!(
            "Saved mitigation plan for {} (expected cost {})",
            style(id).cyan(),
            format_amount(risk.mitigation.cost_expected_value)
        ),
    );
    Ok(())
}
