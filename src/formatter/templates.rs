//! The process-wide template registry used by the HTML formatters

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::Value;

pub const TOOLTIP: &str = "tooltip";
pub const DISPLAY: &str = "display";
pub const INVITATION: &str = "invitation";

// Values inserted with triple braces are escaped (or built) by the formatters themselves
const TOOLTIP_TEMPLATE: &str = "<qt><b>{{{title}}}</b>\
{{#if rows}}<hr>{{#each rows}}{{#unless @first}}<br>{{/unless}}<i>{{label}}:</i>&nbsp;{{{value}}}{{/each}}{{/if}}\
</qt>";

const DISPLAY_TEMPLATE: &str = "<div class=\"incidence\">\n\
<h2>{{{title}}}</h2>\n\
<table class=\"fields\">\n\
{{#each rows}}<tr><th class=\"label\">{{label}}:</th><td>{{{value}}}</td></tr>\n{{/each}}\
</table>\n\
{{#if attendees}}<h3>{{attendees_title}}</h3>\n\
<table class=\"attendees\">\n\
{{#each attendees}}<tr><td>{{{name}}}</td><td>{{role}}</td><td>{{status}}</td></tr>\n{{/each}}\
</table>\n{{/if}}\
{{#if attachments}}<h3>Attachments</h3>\n<ul>\n{{#each attachments}}<li>{{{this}}}</li>\n{{/each}}</ul>\n{{/if}}\
{{#if footer}}<p class=\"footer\"><em>{{footer}}</em></p>\n{{/if}}\
</div>\n";

const INVITATION_TEMPLATE: &str = "<div class=\"invitation\">\n\
<h3>{{header}}</h3>\n\
{{#if note}}<p class=\"note\">{{{note}}}</p>\n{{/if}}\
{{#if rows}}<table class=\"incidence\">\n\
{{#each rows}}<tr><td><b>{{label}}:</b></td><td>{{{value}}}</td></tr>\n{{/each}}\
</table>\n{{/if}}\
{{#if changes}}<p><b>{{changes_title}}</b></p>\n<ul>\n{{#each changes}}<li>{{{this}}}</li>\n{{/each}}</ul>\n{{/if}}\
{{#if rsvp}}<p class=\"rsvp\">{{{rsvp}}}</p>\n{{/if}}\
{{#if attendees}}<table class=\"attendees\">\n\
{{#each attendees}}<tr><td>{{{name}}}</td><td>{{role}}</td><td>{{status}}</td></tr>\n{{/each}}\
</table>\n{{/if}}\
{{#if actions}}<p class=\"actions\">{{#each actions}}{{{this}}}{{#unless @last}} | {{/unless}}{{/each}}</p>\n{{/if}}\
</div>\n";

static TEMPLATES: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut registry = Handlebars::new();
    let sources = [
        (TOOLTIP, TOOLTIP_TEMPLATE),
        (DISPLAY, DISPLAY_TEMPLATE),
        (INVITATION, INVITATION_TEMPLATE),
    ];
    for (name, source) in sources.iter() {
        if let Err(err) = registry.register_template_string(name, source) {
            log::warn!("Unable to register the {} template: {}", name, err);
        }
    }
    registry
});

/// Render one of the registered templates. Errors are logged, and yield an empty string
pub fn render(name: &str, data: &Value) -> String {
    match TEMPLATES.render(name, data) {
        Ok(rendered) => rendered,
        Err(err) => {
            log::warn!("Unable to render the {} template: {}", name, err);
            String::new()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tooltip_template() {
        let data = json!({
            "title": "Lunch",
            "rows": [
                { "label": "Calendar", "value": "Home" },
                { "label": "Where", "value": "Caf&eacute;" },
            ],
        });
        assert_eq!(
            render(TOOLTIP, &data),
            "<qt><b>Lunch</b><hr><i>Calendar:</i>&nbsp;Home<br><i>Where:</i>&nbsp;Caf&eacute;</qt>"
        );
    }

    #[test]
    fn test_unknown_template() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(render("nope", &json!({})), "");
    }
}
