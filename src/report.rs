use std::fmt::Write;

use crate::forum::{PostListing, Thread};
use crate::models::{EducationalContent, TutoringRequest};
use crate::scoring::Feedback;
use crate::views::{
    EvaluationListing, EvaluationReview, ProfileStats, RequestBoard, RequestListing,
    StudentDashboard, TutorDashboard,
};

fn request_line(request: &TutoringRequest, counterpart: Option<&str>) -> String {
    let mut line = format!(
        "- [{}] {} ({}): {}",
        request.status,
        request.subject.display_name(),
        request.id,
        request.description
    );
    if let Some(name) = counterpart {
        let _ = write!(line, " with {name}");
    }
    if let Some(date) = request.scheduled_date {
        let _ = write!(line, " on {}", date.format("%Y-%m-%d %H:%M"));
    }
    line
}

fn request_section(output: &mut String, heading: &str, listings: &[RequestListing]) {
    let _ = writeln!(output, "## {} ({})", heading, listings.len());
    if listings.is_empty() {
        let _ = writeln!(output, "Nothing here yet.");
    }
    for listing in listings {
        let _ = writeln!(
            output,
            "{}",
            request_line(&listing.request, listing.counterpart.as_deref())
        );
    }
    let _ = writeln!(output);
}

pub fn student_dashboard(dashboard: &StudentDashboard) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Welcome, {}", dashboard.profile.full_name);
    let _ = writeln!(
        output,
        "Level: {} | average score: {}%",
        dashboard.level.display_name(),
        dashboard.average_score
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Recent Content");
    if dashboard.recent_content.is_empty() {
        let _ = writeln!(output, "No content published for your level yet.");
    } else {
        for item in &dashboard.recent_content {
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                item.title,
                item.subject.display_name(),
                item.id
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Results");
    if dashboard.recent_results.is_empty() {
        let _ = writeln!(output, "No evaluations taken yet.");
    } else {
        for listing in &dashboard.recent_results {
            let _ = writeln!(
                output,
                "- {}: {}% on {}",
                listing.evaluation_title.as_deref().unwrap_or("(removed evaluation)"),
                listing.result.score,
                listing.result.completed_at.format("%Y-%m-%d")
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Active Tutoring");
    if dashboard.active_requests.is_empty() {
        let _ = writeln!(output, "No open tutoring requests.");
    } else {
        for request in &dashboard.active_requests {
            let _ = writeln!(output, "{}", request_line(request, None));
        }
    }

    output
}

pub fn tutor_dashboard(dashboard: &TutorDashboard) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Welcome, {}", dashboard.profile.full_name);
    let _ = writeln!(
        output,
        "Content published: {} | sessions completed: {}",
        dashboard.content_count, dashboard.completed_count
    );
    let _ = writeln!(output);

    request_section(&mut output, "Open Requests", &dashboard.pending_requests);

    let _ = writeln!(output, "## Upcoming Sessions");
    if dashboard.accepted_requests.is_empty() {
        let _ = writeln!(output, "No sessions scheduled.");
    } else {
        for request in &dashboard.accepted_requests {
            let _ = writeln!(output, "{}", request_line(request, None));
        }
    }

    output
}

pub fn request_board(board: &RequestBoard) -> String {
    let mut output = String::new();
    request_section(&mut output, "Pending", &board.pending);
    request_section(&mut output, "Accepted", &board.accepted);
    request_section(&mut output, "Completed", &board.completed);
    output
}

pub fn request_detail(listing: &RequestListing) -> String {
    let request = &listing.request;
    let mut output = String::new();

    let _ = writeln!(output, "# Tutoring request {}", request.id);
    let _ = writeln!(
        output,
        "Student: {}",
        listing.counterpart.as_deref().unwrap_or("unknown")
    );
    let _ = writeln!(output, "Subject: {}", request.subject.display_name());
    let _ = writeln!(output, "Status: {}", request.status);
    let _ = writeln!(output, "Requested: {}", request.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(date) = request.scheduled_date {
        let _ = writeln!(output, "Scheduled: {}", date.format("%Y-%m-%d %H:%M"));
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", request.description);

    output
}

pub fn content_list(items: &[EducationalContent]) -> String {
    let mut output = String::new();
    if items.is_empty() {
        let _ = writeln!(output, "No content found.");
    }
    for item in items {
        let _ = writeln!(
            output,
            "- {} [{} / {}] {}",
            item.title,
            item.subject.display_name(),
            item.education_level.display_name(),
            item.id
        );
        if let Some(description) = &item.description {
            let _ = writeln!(output, "  {description}");
        }
    }
    output
}

pub fn content_page(item: &EducationalContent) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}", item.title);
    let _ = writeln!(
        output,
        "{} · {}",
        item.subject.display_name(),
        item.education_level.display_name()
    );
    if let Some(description) = &item.description {
        let _ = writeln!(output, "_{description}_");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", item.content);
    output
}

pub fn evaluation_list(listings: &[EvaluationListing]) -> String {
    let mut output = String::new();
    if listings.is_empty() {
        let _ = writeln!(output, "No evaluations available.");
    }
    for listing in listings {
        let marker = if listing.completed { "x" } else { " " };
        let _ = writeln!(
            output,
            "- [{}] {} ({}, {} questions) {}",
            marker,
            listing.evaluation.title,
            listing.evaluation.subject.display_name(),
            listing.evaluation.questions.len(),
            listing.evaluation.id
        );
    }
    output
}

/// Prints the quiz. The answer key stays hidden until the student has a
/// result, which is then reviewed question by question.
pub fn evaluation_review(review: &EvaluationReview) -> String {
    let evaluation = &review.evaluation;
    let mut output = String::new();
    let _ = writeln!(output, "# {}", evaluation.title);
    let _ = writeln!(
        output,
        "{} · {}",
        evaluation.subject.display_name(),
        evaluation.education_level.display_name()
    );
    if let Some(description) = &evaluation.description {
        let _ = writeln!(output, "{description}");
    }
    if let Some(result) = &review.result {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Result: {}%", result.score);
        let _ = writeln!(output, "{}", Feedback::for_score(result.score).message());
    }

    let total = evaluation.questions.len();
    for (number, question) in evaluation.questions.iter().enumerate() {
        let selected = review
            .result
            .as_ref()
            .and_then(|result| result.answers.get(number).copied());
        let _ = writeln!(output);
        let _ = writeln!(output, "{}/{}. {}", number + 1, total, question.prompt);
        for (index, option) in question.options.iter().enumerate() {
            let index = index as i32;
            let mark = match (&review.result, selected == Some(index)) {
                (None, _) => "",
                (Some(_), _) if index == question.correct => "  ✓ correct",
                (Some(_), true) => "  ✗ your answer",
                (Some(_), false) => "",
            };
            let _ = writeln!(output, "   {index}) {option}{mark}");
        }
    }
    output
}

pub fn profile_stats(name: &str, email: &str, stats: &ProfileStats) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {name} <{email}>");
    match stats {
        ProfileStats::Student {
            evaluations_taken,
            tutoring_completed,
        } => {
            let _ = writeln!(output, "- Evaluations taken: {evaluations_taken}");
            let _ = writeln!(output, "- Tutoring sessions completed: {tutoring_completed}");
        }
        ProfileStats::Tutor {
            content_published,
            evaluations_published,
            tutoring_completed,
        } => {
            let _ = writeln!(output, "- Content published: {content_published}");
            let _ = writeln!(output, "- Evaluations published: {evaluations_published}");
            let _ = writeln!(output, "- Tutoring sessions completed: {tutoring_completed}");
        }
    }
    output
}

pub fn forum_posts(posts: &[PostListing]) -> String {
    let mut output = String::new();
    if posts.is_empty() {
        let _ = writeln!(output, "No posts yet.");
    }
    for listing in posts {
        let post = &listing.post;
        let tag = post
            .subject
            .map(|s| format!(" [{}]", s.display_name()))
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "- {}{} by {} on {} ({})",
            post.title,
            tag,
            listing.author_name.as_deref().unwrap_or("unknown"),
            post.created_at.format("%Y-%m-%d"),
            post.id
        );
    }
    output
}

pub fn forum_thread(thread: &Thread) -> String {
    let mut output = String::new();
    let post = &thread.post.post;
    let _ = writeln!(output, "# {}", post.title);
    let _ = writeln!(
        output,
        "by {} on {}",
        thread.post.author_name.as_deref().unwrap_or("unknown"),
        post.created_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", post.content);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Comments ({})", thread.comments.len());
    for listing in &thread.comments {
        let _ = writeln!(
            output,
            "- {}: {}",
            listing.author_name.as_deref().unwrap_or("unknown"),
            listing.comment.content
        );
    }
    output
}
