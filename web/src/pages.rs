//! HTML for the form and result pages.

use crate::service::LookupOutcome;
use std::fmt::Write;
use threadcard_core::{Profile, RankedFriend, Thread, ThreadsConfig};

const STYLE: &str = "body{font-family:sans-serif;background:#101010;color:#e6e6e6;max-width:760px;margin:2rem auto;padding:0 1rem}\
a{color:#8ab4f8}input,button{font-size:1rem;padding:.4rem .6rem}\
.error{color:#ff7b7b}.avatar{border-radius:50%;vertical-align:middle}\
ol.friends li{margin:.3rem 0}.muted{color:#8a8a8a}";

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn lookup_form(username: Option<&str>) -> String {
    format!(
        "<form method=\"post\" action=\"/\">\n\
         <label for=\"username\">Threads username</label>\n\
         <input id=\"username\" name=\"username\" value=\"{}\" required>\n\
         <button type=\"submit\">Find top friends</button>\n</form>\n",
        escape_html(username.unwrap_or_default())
    )
}

/// The landing form, optionally repeating a failed lookup with its error.
pub fn index_page(username: Option<&str>, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Top engaged friends</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(error));
    }
    body.push_str(&lookup_form(username));
    layout("Top engaged friends", &body)
}

pub fn result_page(username: &str, outcome: &LookupOutcome, threads: &ThreadsConfig) -> String {
    let data = &outcome.data;
    let mut body = format!("<h1>@{}</h1>\n", escape_html(username));

    match (&data.user_id, &data.profile) {
        (Some(user_id), Some(profile)) => {
            body.push_str(&profile_section(user_id, profile));
        }
        (Some(user_id), None) => {
            let _ = writeln!(body, "<p class=\"muted\">User ID {}</p>", escape_html(user_id));
        }
        _ => {
            let _ = writeln!(
                body,
                "<p class=\"error\">No Threads profile found for {}.</p>",
                escape_html(username)
            );
        }
    }

    if let Some(image_url) = &outcome.image_url {
        let _ = writeln!(
            body,
            "<p><img src=\"{}\" alt=\"Top friends of {}\" width=\"700\" height=\"250\"></p>",
            escape_html(image_url),
            escape_html(username)
        );
    }

    if data.user_id.is_some() {
        if data.has_threads() {
            body.push_str(&friends_section(&data.top_friends));
            body.push_str(&threads_section(&data.threads, threads));
        } else {
            body.push_str("<p class=\"muted\">This user has no threads yet.</p>\n");
        }
    }

    body.push_str("<p><a href=\"/\">Look up someone else</a></p>\n");
    layout(&format!("@{} on Threads", username), &body)
}

fn profile_section(user_id: &str, profile: &Profile) -> String {
    let mut section = String::from("<section class=\"profile\">\n");
    if let Some(url) = &profile.profile_pic_url {
        let _ = writeln!(
            section,
            "<img class=\"avatar\" src=\"{}\" alt=\"\" width=\"98\" height=\"98\">",
            escape_html(url)
        );
    }
    if let Some(name) = &profile.full_name {
        let _ = write!(section, "<strong>{}</strong>", escape_html(name));
        if profile.is_verified {
            section.push_str(" &#10003;");
        }
        section.push('\n');
    }
    let _ = writeln!(
        section,
        "<p>Followers: {} <span class=\"muted\">(user ID {})</span></p>",
        card_renderer::layout::format_follower_count(profile.follower_count),
        escape_html(user_id)
    );
    if let Some(bio) = &profile.biography {
        let _ = writeln!(section, "<p>{}</p>", escape_html(bio));
    }
    section.push_str("</section>\n");
    section
}

fn friends_section(friends: &[RankedFriend]) -> String {
    if friends.is_empty() {
        return "<p class=\"muted\">Nobody has liked these threads yet.</p>\n".to_string();
    }

    let mut section = String::from("<h2>Top engaged friends</h2>\n<ol class=\"friends\">\n");
    for friend in friends {
        section.push_str("<li>");
        if let Some(url) = &friend.profile_pic_url {
            let _ = write!(
                section,
                "<img class=\"avatar\" src=\"{}\" alt=\"\" width=\"32\" height=\"32\"> ",
                escape_html(url)
            );
        }
        let _ = writeln!(
            section,
            "{} <span class=\"muted\">({} {})</span></li>",
            escape_html(&friend.username),
            friend.like_count,
            if friend.like_count == 1 { "like" } else { "likes" }
        );
    }
    section.push_str("</ol>\n");
    section
}

fn threads_section(threads: &[Thread], config: &ThreadsConfig) -> String {
    let mut section = String::from("<h2>Recent threads</h2>\n<ul class=\"threads\">\n");
    for thread in threads {
        let code = thread.post_code();
        let _ = write!(
            section,
            "<li><a href=\"{}\">{}</a>",
            escape_html(&config.post_url(code)),
            escape_html(code)
        );
        if let Some(caption) = &thread.caption {
            let _ = write!(section, " {}", escape_html(caption));
        }
        let likes = thread.like_count.max(thread.likes.len() as u64);
        let _ = writeln!(
            section,
            " <span class=\"muted\">{} {}</span></li>",
            likes,
            if likes == 1 { "like" } else { "likes" }
        );
    }
    section.push_str("</ul>\n");
    section
}
