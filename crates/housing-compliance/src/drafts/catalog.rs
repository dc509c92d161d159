use std::collections::BTreeMap;

use super::{DraftTemplate, TemplateLibrary, Tone};

const VERSION: &str = "letters-2026.1";
const ORGANISATION: &str = "Riverside Crescent Housing Association";

fn template(
    id: &str,
    title: &str,
    required: &[&str],
    body: &str,
    variants: &[(Tone, &str)],
    closing: Option<&str>,
    signatory: &str,
) -> DraftTemplate {
    DraftTemplate {
        id: id.to_string(),
        title: title.to_string(),
        required_fields: required.iter().map(|field| field.to_string()).collect(),
        body: body.to_string(),
        tone_variants: variants
            .iter()
            .map(|(tone, text)| (*tone, text.to_string()))
            .collect(),
        closing: closing.map(str::to_string),
        signatory: signatory.to_string(),
    }
}

pub(super) fn library() -> TemplateLibrary {
    let sign_offs: BTreeMap<Tone, String> = [
        (Tone::Formal, "Kind regards"),
        (
            Tone::Supportive,
            "Please don't hesitate to contact us if you need any support.\n\nWith kind regards",
        ),
        (Tone::Urgent, "Kind regards"),
        (Tone::Legal, "Yours sincerely"),
    ]
    .into_iter()
    .map(|(tone, text)| (tone, text.to_string()))
    .collect();

    TemplateLibrary {
        version: VERSION.to_string(),
        organisation: ORGANISATION.to_string(),
        sign_offs,
        templates: vec![
            holding_update(),
            arrears_support(),
            complaint_acknowledgement(),
            welfare_check(),
            damp_prevention(),
        ],
    }
}

fn holding_update() -> DraftTemplate {
    template(
        "holding-update",
        "Repair holding update",
        &["reference", "subject_lower", "officer"],
        "I am writing to update you on the progress of {{reference}} regarding {{subject_lower}}.",
        &[
            (
                Tone::Formal,
                "We apologise that this repair is taking longer than expected. We are arranging \
                 the next available appointment and will contact you with a date as soon as possible.",
            ),
            (
                Tone::Supportive,
                "We sincerely apologise for the delay and understand how frustrating this has been. \
                 We want to make sure you are fully supported while the work is completed; if you \
                 need any additional help or adjustments, please let us know.",
            ),
            (
                Tone::Urgent,
                "This repair is now a priority. An operative will contact you within 24 hours to \
                 arrange attendance.",
            ),
        ],
        Some(
            "If you have any questions, please contact your housing officer {{officer}} on \
             020 7123 4567 or email housing@rcha.org.uk.",
        ),
        "{{officer}}",
    )
}

fn arrears_support() -> DraftTemplate {
    template(
        "arrears-support",
        "Arrears support letter",
        &["balance", "officer"],
        "I am writing to you about your rent account, which currently shows {{balance}} owing.",
        &[
            (
                Tone::Formal,
                "We need to discuss this balance with you to agree a plan to bring your account \
                 up to date.",
            ),
            (
                Tone::Supportive,
                "We understand that managing finances can be challenging, especially with the \
                 current cost of living pressures. We are here to help, and we can arrange a home \
                 visit if that would be easier for you.",
            ),
            (
                Tone::Urgent,
                "Your account needs attention now. Please contact us this week so that we can \
                 agree a plan together.",
            ),
            (
                Tone::Legal,
                "Please note that if we do not hear from you within 14 days, we may need to take \
                 further action in accordance with the Pre-Action Protocol for Possession Claims.",
            ),
        ],
        Some(
            "We would also like to offer you a free, confidential benefits check to make sure you \
             are receiving all the financial support you are entitled to.\n\nPlease contact \
             {{officer}} on 020 7123 4567 to discuss your options.",
        ),
        "{{officer}}",
    )
}

fn complaint_acknowledgement() -> DraftTemplate {
    template(
        "complaint-acknowledgement",
        "Complaint acknowledgement",
        &["reference", "handler"],
        "Thank you for raising your concerns with us. I am writing to acknowledge receipt of \
         complaint {{reference}}.\n\nUnder our complaints procedure:\n\n\
         - Stage 1: we will send a full written response within 10 working days\n\
         - Stage 2: if you remain dissatisfied, a senior manager will review your case within \
         20 working days\n\
         - You can contact the Housing Ombudsman Service at any time",
        &[
            (
                Tone::Formal,
                "Your complaint has been assigned to {{handler}}, who will investigate your \
                 concerns and may contact you to discuss them in more detail.",
            ),
            (
                Tone::Supportive,
                "Your complaint has been assigned to {{handler}}, who will investigate your \
                 concerns. We want our communication to be accessible and appropriate for you; if \
                 you need any adjustments to how we handle this complaint, please let us know.",
            ),
        ],
        None,
        "Complaints Team",
    )
}

fn welfare_check() -> DraftTemplate {
    template(
        "welfare-check",
        "Welfare check invitation",
        &["officer"],
        "We hope this letter finds you well. As part of our commitment to supporting all our \
         tenants, we would like to arrange a welfare check visit.",
        &[
            (
                Tone::Formal,
                "We check in with all our tenants regularly to make sure everything is going well \
                 with your home and to see if there is anything we can help with.",
            ),
            (
                Tone::Supportive,
                "We want to make sure you are receiving all the support you need and to see if \
                 there is anything we can help with.",
            ),
        ],
        Some(
            "This is an informal visit. Please contact {{officer}} on 020 7123 4567 to arrange a \
             convenient time, or reply to this letter with your preferred dates and times.",
        ),
        "{{officer}}",
    )
}

fn damp_prevention() -> DraftTemplate {
    template(
        "damp-prevention",
        "Damp and mould prevention advice",
        &["officer"],
        "We are writing to share some steps you can take to help prevent damp and mould in your \
         home.",
        &[
            (
                Tone::Formal,
                "Based on our property records, your home may be at increased risk of damp or \
                 condensation over the coming weeks.",
            ),
            (
                Tone::Supportive,
                "We know that damp can affect your health and wellbeing, and we will treat any \
                 report from your household as a priority.",
            ),
            (
                Tone::Urgent,
                "Heavy rainfall is forecast for your area over the coming days and your home may \
                 be at increased risk of damp or condensation.",
            ),
        ],
        Some(
            "1. Ventilation: open windows briefly each morning to let moisture escape\n\
             2. Heating: keep a steady temperature of at least 18°C throughout your home\n\
             3. Moisture: use extractor fans when cooking or bathing and dry clothes in a \
             well-ventilated room\n\
             4. Furniture: keep furniture slightly away from external walls\n\
             5. Report quickly: tell us about any new damp patches, condensation or mould\n\n\
             Please report any signs of damp or mould by calling 020 7123 4567 or emailing \
             repairs@rcha.org.uk. We are required by law to respond to damp and mould reports \
             within strict timescales.",
        ),
        "{{officer}}",
    )
}
