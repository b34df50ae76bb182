mod console_report_view;

pub use console_report_view::ConsoleReportView;
